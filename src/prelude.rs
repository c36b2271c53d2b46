//! Storefront pricing prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{Catalog, CatalogError, PromotionCatalog},
    discounts::DiscountError,
    pricing::{LinePricing, PricingError, PricingResult, price_cart},
    products::{Offer, OfferKey, Product, ProductKey},
    promotions::{
        Promotion, PromotionConfigError, PromotionError, PromotionKey, PromotionKind,
        PromotionRecord,
        types::{NPlusOneFree, ProductDiscount, QuantityThresholdDiscount, WholeCartDiscount},
    },
    receipt::{Receipt, ReceiptError},
};
