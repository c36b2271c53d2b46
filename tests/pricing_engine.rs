//! Pricing engine behaviour against catalogs built in code.

use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, GBP},
};
use slotmap::SlotMap;
use smallvec::SmallVec;
use testresult::TestResult;

use storefront_pricing::{
    cart::Cart,
    catalog::{Catalog, CatalogError, PromotionCatalog},
    pricing::{PricingError, price_cart},
    products::{Offer, OfferKey, Product, ProductKey},
    promotions::{
        Promotion, PromotionKey, PromotionKind, PromotionRecord,
        types::{NPlusOneFree, ProductDiscount},
    },
};

fn gbp(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, GBP)
}

/// Catalog with `n` products, one offer each, all priced at `price_minor`.
fn shop(n: usize, price_minor: i64) -> TestResult<(Catalog<'static>, Vec<ProductKey>, Vec<OfferKey>)> {
    let mut catalog = Catalog::new(GBP);
    let mut products = Vec::new();
    let mut offers = Vec::new();

    for idx in 0..n {
        let product = catalog.insert_product(Product::new(format!("Product {idx}")));
        let offer = catalog.insert_offer(Offer::new(product, "Seller", gbp(price_minor)))?;

        products.push(product);
        offers.push(offer);
    }

    Ok((catalog, products, offers))
}

fn fill_cart(catalog: &Catalog<'static>, offers: &[OfferKey]) -> TestResult<Cart<'static>> {
    let mut cart = Cart::new(GBP);

    for offer in offers {
        cart.add(*offer, catalog.offer(*offer).ok_or("missing offer")?, 1)?;
    }

    Ok(cart)
}

fn whole_cart_record() -> PromotionRecord<'static> {
    let mut record = PromotionRecord::new("15% off big carts", 5, GBP);
    record.percent_discount = 15;
    record.min_quantity = 5;
    record.min_amount = gbp(100_000);
    record.is_active = true;

    record
}

#[test]
fn largest_discount_wins_without_stacking() -> TestResult {
    let (mut catalog, products, offers) = shop(1, 10_000)?;
    let product = *products.first().ok_or("no product")?;
    let offer = *offers.first().ok_or("no offer")?;

    let mut ten_percent = PromotionRecord::new("10%", 1, GBP);
    ten_percent.percent_discount = 10;
    ten_percent.is_active = true;
    ten_percent.products = vec![product];

    let mut fixed = PromotionRecord::new("£15 off", 1, GBP);
    fixed.fixed_discount = gbp(1500);
    fixed.is_active = true;
    fixed.products = vec![product];

    catalog.insert_promotion(ten_percent)?;
    let winner = catalog.insert_promotion(fixed)?;

    let cart = fill_cart(&catalog, &offers)?;
    let result = price_cart(&cart, &catalog)?;
    let line = result.line(offer).ok_or("missing line")?;

    assert_eq!(line.discount, gbp(1500));
    assert_eq!(line.promotion, winner);
    assert_eq!(result.due(), gbp(8500));

    Ok(())
}

#[test]
fn whole_cart_needs_both_thresholds() -> TestResult {
    // 4 lines worth £900.00 in total
    let (mut catalog, _products, offers) = shop(4, 22_500)?;
    catalog.insert_promotion(whole_cart_record())?;

    let cart = fill_cart(&catalog, &offers)?;
    let result = price_cart(&cart, &catalog)?;

    assert_eq!(result.subtotal(), gbp(90_000));
    assert_eq!(result.total_discount(), gbp(0));

    // 5 lines worth £1200.00 in total
    let (mut catalog, _products, offers) = shop(5, 24_000)?;
    catalog.insert_promotion(whole_cart_record())?;

    let cart = fill_cart(&catalog, &offers)?;
    let result = price_cart(&cart, &catalog)?;

    assert_eq!(result.subtotal(), gbp(120_000));
    assert_eq!(result.total_discount(), gbp(18_000));
    assert_eq!(result.due(), gbp(102_000));

    Ok(())
}

#[test]
fn whole_cart_counts_lines_not_units() -> TestResult {
    let (mut catalog, _products, offers) = shop(1, 150_000)?;
    catalog.insert_promotion(whole_cart_record())?;

    let offer = *offers.first().ok_or("no offer")?;
    let mut cart = Cart::new(GBP);
    cart.add(offer, catalog.offer(offer).ok_or("missing offer")?, 10)?;

    let result = price_cart(&cart, &catalog)?;

    assert_eq!(cart.total_quantity(), 10);
    assert_eq!(result.total_discount(), gbp(0));

    Ok(())
}

#[test]
fn pricing_is_idempotent() -> TestResult {
    let (mut catalog, _products, offers) = shop(5, 24_000)?;
    catalog.insert_promotion(whole_cart_record())?;

    let cart = fill_cart(&catalog, &offers)?;

    let first = price_cart(&cart, &catalog)?;
    let second = price_cart(&cart, &catalog)?;

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn totals_follow_cart_changes() -> TestResult {
    let (mut catalog, products, offers) = shop(1, 1000)?;
    let product = *products.first().ok_or("no product")?;
    let offer = *offers.first().ok_or("no offer")?;

    let mut record = PromotionRecord::new("2+1", 3, GBP);
    record.min_quantity = 2;
    record.is_active = true;
    record.products = vec![product];

    catalog.insert_promotion(record)?;

    let mut cart = fill_cart(&catalog, &offers)?;

    assert_eq!(price_cart(&cart, &catalog)?.total_discount(), gbp(0));

    cart.set_quantity(offer, catalog.offer(offer).ok_or("missing offer")?, 6)?;

    assert_eq!(price_cart(&cart, &catalog)?.total_discount(), gbp(2000));

    cart.decrement(offer)?;

    assert_eq!(price_cart(&cart, &catalog)?.total_discount(), gbp(1000));

    cart.remove(offer);

    let result = price_cart(&cart, &catalog)?;

    assert_eq!(result.subtotal(), gbp(0));
    assert_eq!(result.due(), gbp(0));

    Ok(())
}

#[test]
fn delisted_offer_blocks_pricing_until_replaced() -> TestResult {
    let (mut catalog, products, offers) = shop(1, 1000)?;
    let product = *products.first().ok_or("no product")?;
    let offer = *offers.first().ok_or("no offer")?;

    let cart = fill_cart(&catalog, &offers)?;

    catalog.remove_offer(offer);
    let relisted = catalog.insert_offer(Offer::new(product, "Seller", gbp(5000)))?;

    assert_eq!(
        price_cart(&cart, &catalog),
        Err(PricingError::Catalog(CatalogError::OfferNotFound(offer)))
    );

    let mut cart = cart;
    cart.remove(offer);
    cart.add(relisted, catalog.offer(relisted).ok_or("missing offer")?, 1)?;

    assert_eq!(price_cart(&cart, &catalog)?.subtotal(), gbp(5000));

    Ok(())
}

/// Catalog backed by plain maps, standing in for a database-backed store.
#[derive(Debug, Default)]
struct MapCatalog {
    offers: FxHashMap<OfferKey, ProductKey>,
    promotions: SlotMap<PromotionKey, Promotion<'static>>,
}

impl PromotionCatalog<'static> for MapCatalog {
    fn product_for_offer(&self, offer: OfferKey) -> Result<ProductKey, CatalogError> {
        self.offers
            .get(&offer)
            .copied()
            .ok_or(CatalogError::OfferNotFound(offer))
    }

    fn promotions_for_product(&self, product: ProductKey) -> SmallVec<[&Promotion<'static>; 4]> {
        self.promotions
            .values()
            .filter(|promotion| promotion.applies_to(product))
            .collect()
    }
}

#[test]
fn engine_works_with_any_promotion_catalog() -> TestResult {
    let mut products: SlotMap<ProductKey, ()> = SlotMap::with_key();
    let mut offer_keys: SlotMap<OfferKey, ()> = SlotMap::with_key();

    let product = products.insert(());
    let offer = offer_keys.insert(());

    let mut catalog = MapCatalog::default();
    catalog.offers.insert(offer, product);

    let free = catalog.promotions.insert_with_key(|key| {
        Promotion::new(
            key,
            "3+1",
            PromotionKind::NPlusOneFree(NPlusOneFree::new(3)),
            true,
            [product],
        )
    });

    catalog.promotions.insert_with_key(|key| {
        Promotion::new(
            key,
            "5%",
            PromotionKind::ProductDiscount(ProductDiscount::new(5, gbp(0))),
            true,
            [product],
        )
    });

    let mut cart = Cart::new(GBP);
    cart.add(offer, &Offer::new(product, "Seller", gbp(400)), 8)?;

    let result = price_cart(&cart, &catalog)?;
    let line = result.line(offer).ok_or("missing line")?;

    // 8 units with 3+1: 2 free = £8.00, beating 5% of £32.00 = £1.60
    assert_eq!(line.discount, gbp(800));
    assert_eq!(line.promotion, Some(free));
    assert_eq!(result.due(), gbp(2400));

    Ok(())
}
