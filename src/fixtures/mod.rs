//! Fixtures
//!
//! YAML catalogs and carts for examples and tests. Catalogs live in
//! `<base>/catalogs/<name>.yml`, carts in `<base>/carts/<name>.yml`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, CatalogError},
    fixtures::{
        cart::CartFixture,
        catalog::{CatalogFixture, parse_currency, parse_price},
    },
    products::{Offer, OfferKey, Product, ProductKey},
    promotions::{PromotionKey, PromotionRecord},
};

pub mod cart;
pub mod catalog;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Offer not found
    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    /// Promotion not found, or skipped because its kind is unsupported
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// No catalog loaded yet
    #[error("No catalog loaded")]
    NoCatalog,

    /// No cart loaded yet
    #[error("No cart loaded")]
    NoCart,

    /// Catalog rejected a fixture entry
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Cart rejected a fixture line
    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog built from the loaded catalog file
    catalog: Option<Catalog<'a>>,

    /// Cart built from the loaded cart file
    cart: Option<Cart<'a>>,

    /// String key -> `SlotMap` key mappings for lookups
    product_keys: FxHashMap<String, ProductKey>,
    offer_keys: FxHashMap<String, OfferKey>,
    promotion_keys: FxHashMap<String, PromotionKey>,
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            cart: None,
            product_keys: FxHashMap::default(),
            offer_keys: FxHashMap::default(),
            promotion_keys: FxHashMap::default(),
        }
    }

    /// Load a catalog file, replacing any catalog (and cart) loaded before.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a key reference is dangling, or an
    /// amount is in a currency other than the file's.
    pub fn load_catalog(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogFixture = serde_norway::from_str(&contents)?;

        let currency = parse_currency(&fixture.currency)?;
        let mut catalog = Catalog::new(currency);

        self.product_keys.clear();
        self.offer_keys.clear();
        self.promotion_keys.clear();
        self.cart = None;

        for (key, product) in fixture.products {
            let product_key = catalog.insert_product(Product::new(product.name));

            self.product_keys.insert(key, product_key);
        }

        for (key, offer) in fixture.offers {
            let product = self.product_key(&offer.product)?;
            let price = parse_price(&offer.price)?;
            let offer_key = catalog.insert_offer(Offer::new(product, offer.seller, price))?;

            self.offer_keys.insert(key, offer_key);
        }

        for (key, promotion) in fixture.promotions {
            let mut record = PromotionRecord::new(promotion.name, promotion.kind, currency);

            record.percent_discount = promotion.percent;
            record.fixed_discount = parse_optional_price(promotion.fixed.as_deref(), currency)?;
            record.min_amount = parse_optional_price(promotion.min_amount.as_deref(), currency)?;
            record.is_active = promotion.active;
            record.products = promotion
                .products
                .iter()
                .map(|product| self.product_key(product))
                .collect::<Result<_, _>>()?;

            if let Some(min_quantity) = promotion.min_quantity {
                record.min_quantity = min_quantity;
            }

            if let Some(promotion_key) = catalog.insert_promotion(record)? {
                self.promotion_keys.insert(key, promotion_key);
            }
        }

        self.catalog = Some(catalog);

        Ok(self)
    }

    /// Load a cart file against the loaded catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if no catalog is loaded, the file cannot be read or parsed, or a line
    /// references an unknown offer.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        let catalog = self.catalog.as_ref().ok_or(FixtureError::NoCatalog)?;
        let mut cart = Cart::new(catalog.currency());

        for line in fixture.lines {
            let offer_key = self.offer_key(&line.offer)?;
            let offer = catalog
                .offer(offer_key)
                .ok_or_else(|| FixtureError::OfferNotFound(line.offer.clone()))?;

            cart.add(offer_key, offer, line.quantity)?;
        }

        self.cart = Some(cart);

        Ok(self)
    }

    /// Load a catalog and a cart from the default base path.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be loaded.
    pub fn from_set(catalog: &str, cart: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_catalog(catalog)?.load_cart(cart)?;

        Ok(fixture)
    }

    /// Get the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCatalog`] if no catalog is loaded.
    pub fn catalog(&self) -> Result<&Catalog<'a>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCatalog)
    }

    /// Get the loaded catalog for modification
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCatalog`] if no catalog is loaded.
    pub fn catalog_mut(&mut self) -> Result<&mut Catalog<'a>, FixtureError> {
        self.catalog.as_mut().ok_or(FixtureError::NoCatalog)
    }

    /// Get the loaded cart
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCart`] if no cart is loaded.
    pub fn cart(&self) -> Result<&Cart<'a>, FixtureError> {
        self.cart.as_ref().ok_or(FixtureError::NoCart)
    }

    /// Get the loaded cart for modification
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCart`] if no cart is loaded.
    pub fn cart_mut(&mut self) -> Result<&mut Cart<'a>, FixtureError> {
        self.cart.as_mut().ok_or(FixtureError::NoCart)
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get an offer key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the offer is not found.
    pub fn offer_key(&self, key: &str) -> Result<OfferKey, FixtureError> {
        self.offer_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::OfferNotFound(key.to_string()))
    }

    /// Get a promotion key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion is not found or was skipped when loading.
    pub fn promotion_key(&self, key: &str) -> Result<PromotionKey, FixtureError> {
        self.promotion_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))
    }
}

fn parse_optional_price(
    price: Option<&str>,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, FixtureError> {
    price.map_or_else(|| Ok(Money::from_minor(0, currency)), parse_price)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use testresult::TestResult;

    use crate::cart::CartLine;

    use super::*;

    const CATALOG: &str = r#"
currency: GBP
products:
  apple:
    name: Apple
offers:
  apple-orchard:
    product: apple
    seller: Orchard Co
    price: 50.00 GBP
promotions:
  apples-off:
    name: Apples £10 off
    kind: 1
    fixed: 10.00 GBP
    active: true
    products: [apple]
  by-category:
    name: Category promotion
    kind: 2
    percent: 10
    active: true
"#;

    fn write_set(catalog: &str, cart: &str) -> TestResult<TempDir> {
        let dir = TempDir::new()?;

        fs::create_dir_all(dir.path().join("catalogs"))?;
        fs::create_dir_all(dir.path().join("carts"))?;
        fs::write(dir.path().join("catalogs/test.yml"), catalog)?;
        fs::write(dir.path().join("carts/test.yml"), cart)?;

        Ok(dir)
    }

    #[test]
    fn loads_catalog_and_cart() -> TestResult {
        let dir = write_set(CATALOG, "lines:\n  - offer: apple-orchard\n    quantity: 2\n")?;
        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_catalog("test")?.load_cart("test")?;

        let offer = fixture.offer_key("apple-orchard")?;
        let cart = fixture.cart()?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(offer).map(CartLine::quantity), Some(2));
        assert!(fixture.promotion_key("apples-off").is_ok());

        Ok(())
    }

    #[test]
    fn unsupported_promotion_kind_is_skipped() -> TestResult {
        let dir = write_set(CATALOG, "lines: []\n")?;
        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_catalog("test")?;

        assert!(matches!(
            fixture.promotion_key("by-category"),
            Err(FixtureError::PromotionNotFound(key)) if key == "by-category"
        ));
        assert_eq!(fixture.catalog()?.promotions().count(), 1);

        Ok(())
    }

    #[test]
    fn cart_with_unknown_offer_fails() -> TestResult {
        let dir = write_set(CATALOG, "lines:\n  - offer: nope\n    quantity: 1\n")?;
        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_catalog("test")?;

        let result = fixture.load_cart("test");

        assert!(matches!(result, Err(FixtureError::OfferNotFound(key)) if key == "nope"));

        Ok(())
    }

    #[test]
    fn cart_needs_catalog() -> TestResult {
        let dir = write_set(CATALOG, "lines: []\n")?;
        let mut fixture = Fixture::with_base_path(dir.path());

        assert!(matches!(fixture.load_cart("test"), Err(FixtureError::NoCatalog)));

        Ok(())
    }

    #[test]
    fn offer_in_other_currency_is_rejected() -> TestResult {
        let catalog = CATALOG.replace("50.00 GBP", "50.00 USD");
        let dir = write_set(&catalog, "lines: []\n")?;
        let mut fixture = Fixture::with_base_path(dir.path());

        let result = fixture.load_catalog("test");

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::CurrencyMismatch("USD", "GBP")))
        ));

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut fixture = Fixture::with_base_path("/nonexistent/fixtures");

        assert!(matches!(fixture.load_catalog("nope"), Err(FixtureError::Io(_))));
    }
}
