//! Whole Cart Discount
//!
//! A percentage off every line of a cart that meets the promotion's distinct-line and/or
//! subtotal thresholds. Thresholds are checked by [`crate::promotions::eligibility`].

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::CartLine,
    discounts::{DiscountError, percent_of, times},
};

/// Whole-cart discount configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WholeCartDiscount<'a> {
    percent: u16,
    min_quantity: u32,
    min_amount: Money<'a, Currency>,
}

impl<'a> WholeCartDiscount<'a> {
    /// Create a new whole-cart discount. A zero threshold is treated as unset.
    pub fn new(percent: u16, min_quantity: u32, min_amount: Money<'a, Currency>) -> Self {
        Self {
            percent,
            min_quantity,
            min_amount,
        }
    }

    /// Return the percent points
    pub fn percent(&self) -> u16 {
        self.percent
    }

    /// Return the distinct-line threshold
    pub fn min_quantity(&self) -> u32 {
        self.min_quantity
    }

    /// Return the subtotal threshold
    pub fn min_amount(&self) -> &Money<'a, Currency> {
        &self.min_amount
    }

    /// Calculate the discount for a line of an eligible cart.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::Overflow`] if arithmetic overflows.
    pub fn discount(&self, line: &CartLine<'a>) -> Result<Money<'a, Currency>, DiscountError> {
        let amount = if self.percent == 0 {
            Decimal::ZERO
        } else {
            percent_of(times(*line.unit_price().amount(), line.quantity())?, self.percent)?
        };

        Ok(Money::from_decimal(amount, line.unit_price().currency()))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::products::OfferKey;

    use super::*;

    #[test]
    fn percent_of_line_total() -> TestResult {
        let promo = WholeCartDiscount::new(15, 5, Money::from_minor(100_000, GBP));
        let line = CartLine::new(OfferKey::default(), Money::from_minor(40_000, GBP), 3)?;

        assert_eq!(promo.discount(&line)?, Money::from_minor(18_000, GBP));

        Ok(())
    }

    #[test]
    fn zero_percent_gives_nothing() -> TestResult {
        let promo = WholeCartDiscount::new(0, 1, Money::from_minor(0, GBP));
        let line = CartLine::new(OfferKey::default(), Money::from_minor(40_000, GBP), 3)?;

        assert_eq!(promo.discount(&line)?, Money::from_minor(0, GBP));

        Ok(())
    }
}
