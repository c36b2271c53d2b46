//! Catalog
//!
//! Read-side lookups the pricing engine needs from the product & promotion store, plus an
//! in-memory [`Catalog`] implementing them.

use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    products::{Offer, OfferKey, Product, ProductKey},
    promotions::{Promotion, PromotionError, PromotionKey, PromotionRecord},
};

/// Errors raised by catalog lookups and updates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The offer is not (or no longer) listed.
    #[error("Offer {0:?} not found in catalog")]
    OfferNotFound(OfferKey),

    /// The product is not in the catalog.
    #[error("Product {0:?} not found in catalog")]
    ProductNotFound(ProductKey),

    /// The promotion is not in the catalog.
    #[error("Promotion {0:?} not found in catalog")]
    PromotionNotFound(PromotionKey),

    /// An amount is in a different currency than the catalog (found, expected).
    #[error("Amount has currency {0}, but catalog has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),
}

/// Lookups the pricing engine performs against the catalog store.
///
/// Implementations must present a consistent snapshot for the duration of one pricing run.
pub trait PromotionCatalog<'a> {
    /// Resolve an offer to the product it lists.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::OfferNotFound`] if the offer no longer exists.
    fn product_for_offer(&self, offer: OfferKey) -> Result<ProductKey, CatalogError>;

    /// Return the active promotions for a product: those associated with it, plus every
    /// active whole-cart promotion. Unknown products yield an empty set.
    fn promotions_for_product(&self, product: ProductKey) -> SmallVec<[&Promotion<'a>; 4]>;
}

/// In-memory catalog of products, offers and promotions in a single currency.
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    currency: &'static Currency,
    products: SlotMap<ProductKey, Product>,
    offers: SlotMap<OfferKey, Offer<'a>>,
    promotions: SlotMap<PromotionKey, Promotion<'a>>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            products: SlotMap::with_key(),
            offers: SlotMap::with_key(),
            promotions: SlotMap::with_key(),
        }
    }

    /// Get the currency of the catalog.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Add a product.
    pub fn insert_product(&mut self, product: Product) -> ProductKey {
        self.products.insert(product)
    }

    /// Add an offer for an existing product.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the product is unknown or the price is in another currency.
    pub fn insert_offer(&mut self, offer: Offer<'a>) -> Result<OfferKey, CatalogError> {
        if !self.products.contains_key(offer.product()) {
            return Err(CatalogError::ProductNotFound(offer.product()));
        }

        self.ensure_currency(offer.price())?;

        Ok(self.offers.insert(offer))
    }

    /// Delist an offer. Carts still holding it will fail to price.
    pub fn remove_offer(&mut self, key: OfferKey) -> Option<Offer<'a>> {
        self.offers.remove(key)
    }

    /// Add a promotion from a raw record.
    ///
    /// Records with an unsupported kind are skipped and `Ok(None)` is returned, so they never
    /// contribute a discount. Misconfigured records are logged and still added.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if an associated product is unknown or an amount is in another
    /// currency.
    pub fn insert_promotion(
        &mut self,
        record: PromotionRecord<'a>,
    ) -> Result<Option<PromotionKey>, CatalogError> {
        if let Some(missing) = record
            .products
            .iter()
            .find(|product| !self.products.contains_key(**product))
        {
            return Err(CatalogError::ProductNotFound(*missing));
        }

        self.ensure_currency(&record.fixed_discount)?;
        self.ensure_currency(&record.min_amount)?;

        let name = record.name.clone();
        let code = record.code;

        match self
            .promotions
            .try_insert_with_key(|key| Promotion::from_record(key, record))
        {
            Ok(key) => {
                if let Some(Err(problem)) = self.promotions.get(key).map(Promotion::validate) {
                    warn!(promotion = %name, code, %problem, "misconfigured promotion");
                }

                debug!(promotion = %name, code, "added promotion");

                Ok(Some(key))
            }
            Err(PromotionError::UnsupportedKind(code)) => {
                warn!(promotion = %name, code, "skipping promotion with unsupported kind");

                Ok(None)
            }
        }
    }

    /// Switch a promotion on or off.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::PromotionNotFound`] if the promotion is unknown.
    pub fn set_promotion_active(
        &mut self,
        key: PromotionKey,
        is_active: bool,
    ) -> Result<(), CatalogError> {
        let promotion = self
            .promotions
            .get_mut(key)
            .ok_or(CatalogError::PromotionNotFound(key))?;

        promotion.set_active(is_active);

        Ok(())
    }

    /// Get a product.
    pub fn product(&self, key: ProductKey) -> Option<&Product> {
        self.products.get(key)
    }

    /// Get an offer.
    pub fn offer(&self, key: OfferKey) -> Option<&Offer<'a>> {
        self.offers.get(key)
    }

    /// Get a promotion.
    pub fn promotion(&self, key: PromotionKey) -> Option<&Promotion<'a>> {
        self.promotions.get(key)
    }

    /// Iterate over every promotion, active or not.
    pub fn promotions(&self) -> impl Iterator<Item = &Promotion<'a>> {
        self.promotions.values()
    }

    fn ensure_currency(&self, amount: &Money<'_, Currency>) -> Result<(), CatalogError> {
        if amount.currency() == self.currency {
            Ok(())
        } else {
            Err(CatalogError::CurrencyMismatch(
                amount.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ))
        }
    }
}

impl<'a> PromotionCatalog<'a> for Catalog<'a> {
    fn product_for_offer(&self, offer: OfferKey) -> Result<ProductKey, CatalogError> {
        self.offers
            .get(offer)
            .map(Offer::product)
            .ok_or(CatalogError::OfferNotFound(offer))
    }

    fn promotions_for_product(&self, product: ProductKey) -> SmallVec<[&Promotion<'a>; 4]> {
        self.promotions
            .values()
            .filter(|promotion| promotion.applies_to(product))
            .collect()
    }
}
