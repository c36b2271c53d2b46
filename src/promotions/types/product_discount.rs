//! Product Discount
//!
//! A percentage of the line total, or a fixed amount off every unit, on associated products.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::CartLine,
    discounts::{DiscountError, ensure_currency, percent_of, times},
};

/// Discount configuration for product promotions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProductDiscount<'a> {
    percent: u16,
    fixed: Money<'a, Currency>,
}

impl<'a> ProductDiscount<'a> {
    /// Create a new product discount. A non-zero `percent` takes precedence over `fixed`.
    pub fn new(percent: u16, fixed: Money<'a, Currency>) -> Self {
        Self { percent, fixed }
    }

    /// Return the percent points
    pub fn percent(&self) -> u16 {
        self.percent
    }

    /// Return the fixed amount per unit
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

        let amount = if self.percent != 0 {
            percent_of(times(*line.unit_price().amount(), line.quantity())?, self.percent)?
        } else if !self.fixed.amount().is_zero() {
            ensure_currency(currency, &self.fixed)?;

            times(*self.fixed.amount(), line.quantity())?
        } else {
            Decimal::ZERO
        };

        Ok(Money::from_decimal(amount, currency))
    }
}
