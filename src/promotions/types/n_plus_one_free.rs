//! N+1 Free
//!
//! For every `min_quantity` units bought, one more unit of the same line is free
//! (`min_quantity = 1` is the classic "1+1", `2` is "2+1").

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::CartLine,
    discounts::{DiscountError, times},
};

/// Buy-N-get-one-free configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NPlusOneFree {
    min_quantity: u32,
}

impl NPlusOneFree {
    /// Create a new N+1 promotion.
    pub const fn new(min_quantity: u32) -> Self {
        Self { min_quantity }
    }

    /// Return N, the number of paid units per free unit
    pub const fn min_quantity(&self) -> u32 {
        self.min_quantity
    }

    /// Number of free units for a line quantity.
    pub const fn free_units(&self, quantity: u32) -> u32 {
        if self.min_quantity == 0 || quantity <= self.min_quantity {
            return 0;
        }

        // `quantity > min_quantity` so the group size cannot overflow.
        quantity / (self.min_quantity + 1)
    }

    /// Calculate the discount for a line.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::Overflow`] if arithmetic overflows.
    pub fn discount<'a>(&self, line: &CartLine<'a>) -> Result<Money<'a, Currency>, DiscountError> {
        let currency = line.unit_price().currency();

        let amount = match self.free_units(line.quantity()) {
            0 => Decimal::ZERO,
            free => times(*line.unit_price().amount(), free)?,
        };

        Ok(Money::from_decimal(amount, currency))
    }
}
