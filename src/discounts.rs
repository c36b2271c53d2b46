//! Discounts
//!
//! Exact decimal helpers shared by the promotion discount handlers.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// A fixed discount amount is denominated in a different currency than the line it applies to.
    #[error("discount in {found} cannot apply to a line priced in {expected}")]
    CurrencyMismatch {
        /// Currency of the cart line
        expected: &'static str,

        /// Currency of the promotion amount
        found: &'static str,
    },

    /// Decimal arithmetic overflowed.
    #[error("discount arithmetic overflowed")]
    Overflow,
}

/// Calculate `percent` percent points of `amount`, without rounding.
///
/// # Errors
///
/// Returns [`DiscountError::Overflow`] if the multiplication leaves the decimal range.
pub fn percent_of(amount: Decimal, percent: u16) -> Result<Decimal, DiscountError> {
    amount
        .checked_mul(Decimal::from(percent))
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(DiscountError::Overflow)
}

/// Multiply a unit amount by a quantity.
///
/// # Errors
///
/// Returns [`DiscountError::Overflow`] if the multiplication leaves the decimal range.
pub fn times(amount: Decimal, quantity: u32) -> Result<Decimal, DiscountError> {
    amount
        .checked_mul(Decimal::from(quantity))
        .ok_or(DiscountError::Overflow)
}

/// Ensure a promotion amount can be applied to a line priced in `line_currency`.
///
/// # Errors
///
/// Returns [`DiscountError::CurrencyMismatch`] when the currencies differ.
pub fn ensure_currency(
    line_currency: &Currency,
    amount: &Money<'_, Currency>,
) -> Result<(), DiscountError> {
    if amount.currency() == line_currency {
        Ok(())
    } else {
        Err(DiscountError::CurrencyMismatch {
            expected: line_currency.iso_alpha_code,
            found: amount.currency().iso_alpha_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_keeps_exact_fractions() -> TestResult {
        // 15% of 33.33 is 4.9995, which must not be rounded to the currency exponent.
        let result = percent_of(Decimal::new(3333, 2), 15)?;

        assert_eq!(result, Decimal::new(49995, 4));

        Ok(())
    }

    #[test]
    fn percent_of_zero_percent_is_zero() -> TestResult {
        assert_eq!(percent_of(Decimal::new(5000, 2), 0)?, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn percent_of_overflow_returns_error() {
        let result = percent_of(Decimal::MAX, 200);

        assert_eq!(result, Err(DiscountError::Overflow));
    }

    #[test]
    fn times_multiplies_by_quantity() -> TestResult {
        assert_eq!(times(Decimal::new(1050, 2), 3)?, Decimal::new(3150, 2));

        Ok(())
    }

    #[test]
    fn times_overflow_returns_error() {
        assert_eq!(times(Decimal::MAX, 2), Err(DiscountError::Overflow));
    }

    #[test]
    fn ensure_currency_rejects_foreign_amounts() {
        let result = ensure_currency(GBP, &Money::from_minor(100, USD));

        assert_eq!(
            result,
            Err(DiscountError::CurrencyMismatch {
                expected: "GBP",
                found: "USD",
            })
        );
    }

    #[test]
    fn ensure_currency_accepts_same_currency() {
        assert!(ensure_currency(GBP, &Money::from_minor(100, GBP)).is_ok());
    }
}
