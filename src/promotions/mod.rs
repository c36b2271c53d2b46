//! Promotions
//!
//! A promotion pairs a [`PromotionKind`] (what discount it gives) with the activation flag
//! and product associations that decide which cart lines it is considered for.

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use thiserror::Error;

use crate::{cart::CartLine, discounts::DiscountError, products::ProductKey};

pub mod eligibility;
pub mod types;

use types::{NPlusOneFree, ProductDiscount, QuantityThresholdDiscount, WholeCartDiscount};

new_key_type! {
    /// Promotion Key
    pub struct PromotionKey;
}

/// Errors raised when building a promotion from a raw record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionError {
    /// The record's kind code has no discount handler.
    #[error("Unsupported promotion kind code: {0}")]
    UnsupportedKind(u16),
}

/// Misconfigurations that make a promotion contribute little or nothing.
///
/// These are reported by [`Promotion::validate`] and never stop pricing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionConfigError {
    /// Both a percentage and a fixed amount are set; the percentage wins.
    #[error("both percent and fixed discounts are set")]
    PercentAndFixed,

    /// Neither a percentage nor a fixed amount is set.
    #[error("no discount amount is set")]
    NoDiscount,

    /// A whole-cart promotion has neither a quantity nor an amount threshold.
    #[error("whole-cart promotion has no thresholds")]
    NoThresholds,

    /// An N+1 promotion has a zero quantity.
    #[error("N+1 promotion requires a quantity of at least one")]
    ZeroQuantity,

    /// Percent points above 100.
    #[error("percent discount {0} exceeds 100")]
    PercentOutOfRange(u16),
}

/// Raw promotion record as supplied by the catalog store.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionRecord<'a> {
    /// Promotion name
    pub name: String,

    /// Kind code (1 product discount, 3 N+1 free, 4 quantity threshold, 5 whole cart)
    pub code: u16,

    /// Percent points, 0 if unused
    pub percent_discount: u16,

    /// Fixed amount, 0 if unused
    pub fixed_discount: Money<'a, Currency>,

    /// Quantity threshold
    pub min_quantity: u32,

    /// Cart amount threshold
    pub min_amount: Money<'a, Currency>,

    /// Whether the promotion is switched on
    pub is_active: bool,

    /// Associated products; ignored for whole-cart promotions
    pub products: Vec<ProductKey>,
}

impl<'a> PromotionRecord<'a> {
    /// Create an inactive record with default thresholds and no discount amounts.
    pub fn new(name: impl Into<String>, code: u16, currency: &'a Currency) -> Self {
        Self {
            name: name.into(),
            code,
            percent_discount: 0,
            fixed_discount: Money::from_minor(0, currency),
            min_quantity: 1,
            min_amount: Money::from_minor(0, currency),
            is_active: false,
            products: Vec::new(),
        }
    }
}

/// Promotion kind, with the settings each discount handler needs.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionKind<'a> {
    /// Percent or fixed-per-unit discount on associated products (code 1)
    ProductDiscount(ProductDiscount<'a>),

    /// One free unit for every N bought (code 3)
    NPlusOneFree(NPlusOneFree),

    /// Discount once a line reaches a unit count (code 4)
    QuantityThreshold(QuantityThresholdDiscount<'a>),

    /// Percent discount on every line once cart thresholds are met (code 5)
    WholeCart(WholeCartDiscount<'a>),
}

impl<'a> PromotionKind<'a> {
    /// Build the kind for a raw record.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::UnsupportedKind`] for codes without a handler.
    pub fn from_record(record: &PromotionRecord<'a>) -> Result<Self, PromotionError> {
        Ok(match record.code {
            1 => PromotionKind::ProductDiscount(ProductDiscount::new(
                record.percent_discount,
                record.fixed_discount,
            )),
            3 => PromotionKind::NPlusOneFree(NPlusOneFree::new(record.min_quantity)),
            4 => PromotionKind::QuantityThreshold(QuantityThresholdDiscount::new(
                record.min_quantity,
                record.percent_discount,
                record.fixed_discount,
            )),
            5 => PromotionKind::WholeCart(WholeCartDiscount::new(
                record.percent_discount,
                record.min_quantity,
                record.min_amount,
            )),
            other => return Err(PromotionError::UnsupportedKind(other)),
        })
    }

    /// Return the kind code used by the catalog store.
    pub fn code(&self) -> u16 {
        match self {
            PromotionKind::ProductDiscount(_) => 1,
            PromotionKind::NPlusOneFree(_) => 3,
            PromotionKind::QuantityThreshold(_) => 4,
            PromotionKind::WholeCart(_) => 5,
        }
    }

    /// Calculate the discount this kind gives a single line.
    ///
    /// Whole-cart eligibility is not checked here.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] on currency mismatch or decimal overflow.
    pub fn discount(&self, line: &CartLine<'a>) -> Result<Money<'a, Currency>, DiscountError> {
        match self {
            PromotionKind::ProductDiscount(discount) => discount.discount(line),
            PromotionKind::NPlusOneFree(discount) => discount.discount(line),
            PromotionKind::QuantityThreshold(discount) => discount.discount(line),
            PromotionKind::WholeCart(discount) => discount.discount(line),
        }
    }

    /// Report configuration that makes this kind contribute little or nothing.
    ///
    /// # Errors
    ///
    /// Returns the first [`PromotionConfigError`] found.
    pub fn validate(&self) -> Result<(), PromotionConfigError> {
        match self {
            PromotionKind::ProductDiscount(discount) => {
                validate_amounts(discount.percent(), discount.fixed())
            }
            PromotionKind::NPlusOneFree(discount) => {
                if discount.min_quantity() == 0 {
                    Err(PromotionConfigError::ZeroQuantity)
                } else {
                    Ok(())
                }
            }
            PromotionKind::QuantityThreshold(discount) => {
                validate_amounts(discount.percent(), discount.fixed())
            }
            PromotionKind::WholeCart(discount) => {
                validate_percent(discount.percent())?;

                if discount.percent() == 0 {
                    return Err(PromotionConfigError::NoDiscount);
                }

                if discount.min_quantity() == 0 && discount.min_amount().amount().is_zero() {
                    return Err(PromotionConfigError::NoThresholds);
                }

                Ok(())
            }
        }
    }
}

fn validate_percent(percent: u16) -> Result<(), PromotionConfigError> {
    if percent > 100 {
        Err(PromotionConfigError::PercentOutOfRange(percent))
    } else {
        Ok(())
    }
}

fn validate_amounts(percent: u16, fixed: &Money<'_, Currency>) -> Result<(), PromotionConfigError> {
    validate_percent(percent)?;

    match (percent != 0, !fixed.amount().is_zero()) {
        (true, true) => Err(PromotionConfigError::PercentAndFixed),
        (false, false) => Err(PromotionConfigError::NoDiscount),
        _ => Ok(()),
    }
}

/// A configured discount rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion<'a> {
    key: PromotionKey,
    name: String,
    kind: PromotionKind<'a>,
    is_active: bool,
    products: FxHashSet<ProductKey>,
}

impl<'a> Promotion<'a> {
    /// Create a new promotion.
    pub fn new(
        key: PromotionKey,
        name: impl Into<String>,
        kind: PromotionKind<'a>,
        is_active: bool,
        products: impl IntoIterator<Item = ProductKey>,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            kind,
            is_active,
            products: products.into_iter().collect(),
        }
    }

    /// Build a promotion from a raw record.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::UnsupportedKind`] for codes without a handler.
    pub fn from_record(key: PromotionKey, record: PromotionRecord<'a>) -> Result<Self, PromotionError> {
        let kind = PromotionKind::from_record(&record)?;

        Ok(Self::new(
            key,
            record.name,
            kind,
            record.is_active,
            record.products,
        ))
    }

    /// Return the promotion key
    pub fn key(&self) -> PromotionKey {
        self.key
    }

    /// Return the promotion name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the promotion kind
    pub fn kind(&self) -> &PromotionKind<'a> {
        &self.kind
    }

    /// Whether the promotion is switched on
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Switch the promotion on or off.
    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    /// Products explicitly associated with the promotion
    pub fn products(&self) -> &FxHashSet<ProductKey> {
        &self.products
    }

    /// Whether this is a whole-cart promotion
    pub fn is_whole_cart(&self) -> bool {
        matches!(self.kind, PromotionKind::WholeCart(_))
    }

    /// Whether the promotion is active and targets the product.
    ///
    /// Whole-cart promotions target every product regardless of associations.
    pub fn applies_to(&self, product: ProductKey) -> bool {
        self.is_active && (self.is_whole_cart() || self.products.contains(&product))
    }

    /// Calculate the discount for a single line. See [`PromotionKind::discount`].
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] on currency mismatch or decimal overflow.
    pub fn discount(&self, line: &CartLine<'a>) -> Result<Money<'a, Currency>, DiscountError> {
        self.kind.discount(line)
    }

    /// Report misconfiguration. See [`PromotionKind::validate`].
    ///
    /// # Errors
    ///
    /// Returns the first [`PromotionConfigError`] found.
    pub fn validate(&self) -> Result<(), PromotionConfigError> {
        self.kind.validate()
    }
}
