//! Catalog Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, RUB, USD},
};
use serde::Deserialize;

use crate::fixtures::FixtureError;

/// Catalog file: products, their offers and the promotions running against them
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Currency code for every amount in the file (e.g., "GBP")
    pub currency: String,

    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,

    /// Map of offer key -> offer fixture
    pub offers: FxHashMap<String, OfferFixture>,

    /// Map of promotion key -> promotion fixture
    #[serde(default)]
    pub promotions: FxHashMap<String, PromotionFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,
}

/// Offer Fixture
#[derive(Debug, Deserialize)]
pub struct OfferFixture {
    /// Product key within the same file
    pub product: String,

    /// Seller name
    pub seller: String,

    /// Unit price (e.g., "50.00 GBP")
    pub price: String,
}

/// Promotion Fixture
#[derive(Debug, Deserialize)]
pub struct PromotionFixture {
    /// Promotion name
    pub name: String,

    /// Kind code (1, 3, 4 or 5)
    pub kind: u16,

    /// Percent points
    #[serde(default)]
    pub percent: u16,

    /// Fixed amount (e.g., "10.00 GBP")
    #[serde(default)]
    pub fixed: Option<String>,

    /// Quantity threshold
    #[serde(default)]
    pub min_quantity: Option<u32>,

    /// Cart amount threshold (e.g., "1000.00 GBP")
    #[serde(default)]
    pub min_amount: Option<String>,

    /// Whether the promotion is switched on
    #[serde(default)]
    pub active: bool,

    /// Product keys the promotion is attached to
    #[serde(default)]
    pub products: Vec<String>,
}

/// Parse a currency code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for codes other than GBP, USD, EUR and RUB.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        "RUB" => Ok(RUB),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse price string (e.g., "2.99 GBP") into an exact amount.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", the amount is not a
/// decimal, or the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_decimal(amount, parse_currency(code)?))
}
