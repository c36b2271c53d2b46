//! Products & Offers

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

new_key_type! {
    /// Offer Key
    pub struct OfferKey;
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product name
    pub name: String,
}

impl Product {
    /// Create a new product with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A seller's price listing for a product.
///
/// Offers are the unit priced in a cart; promotions target the product behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer<'a> {
    product: ProductKey,
    seller: String,
    price: Money<'a, Currency>,
}

impl<'a> Offer<'a> {
    /// Create a new offer for a product.
    pub fn new(product: ProductKey, seller: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            product,
            seller: seller.into(),
            price,
        }
    }

    /// Returns the product of the offer
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the seller name
    pub fn seller(&self) -> &str {
        &self.seller
    }

    /// Returns the current listing price
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }
}
