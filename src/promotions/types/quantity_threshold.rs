//! Quantity Threshold Discount
//!
//! A discount on a line once it holds at least `min_quantity` units. The percentage applies to
//! the whole line; a fixed amount is given once per line, not per unit.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::CartLine,
    discounts::{DiscountError, ensure_currency, percent_of, times},
};

/// Quantity threshold configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuantityThresholdDiscount<'a> {
    min_quantity: u32,
    percent: u16,
    fixed: Money<'a, Currency>,
}

impl<'a> QuantityThresholdDiscount<'a> {
    /// Create a new quantity threshold discount.
    pub fn new(min_quantity: u32, percent: u16, fixed: Money<'a, Currency>) -> Self {
        Self {
            min_quantity,
            percent,
            fixed,
        }
    }

    /// Return the unit threshold
    pub fn min_quantity(&self) -> u32 {
        self.min_quantity
    }

    /// Return the percent points
    pub fn percent(&self) -> u16 {
        self.percent
    }

    /// Return the flat amount
    pub fn fixed(&self) -> &Money<'a, Currency> {
        &self.fixed
    }

    /// Calculate the discount for a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixed amount is in another currency or arithmetic overflows.
    pub fn discount(&self, line: &CartLine<'a>) -> Result<Money<'a, Currency>, DiscountError> {
        let currency = line.unit_price().currency();

        let amount = if line.quantity() < self.min_quantity {
            Decimal::ZERO
        } else if self.percent != 0 {
            percent_of(times(*line.unit_price().amount(), line.quantity())?, self.percent)?
        } else if !self.fixed.amount().is_zero() {
            ensure_currency(currency, &self.fixed)?;

            *self.fixed.amount()
        } else {
            Decimal::ZERO
        };

        Ok(Money::from_decimal(amount, currency))
    }
}
