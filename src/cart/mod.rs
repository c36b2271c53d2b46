//! Cart

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    discounts::times,
    products::{Offer, OfferKey},
};

/// Errors related to cart construction or totals.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A line's currency differs from the cart currency (line currency, cart currency).
    #[error("Line has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// No line exists for the offer.
    #[error("No line for offer {0:?}")]
    LineNotFound(OfferKey),

    /// Lines must hold at least one unit.
    #[error("Quantity must be greater than zero")]
    InvalidQuantity,

    /// Line or cart totals left the decimal range.
    #[error("Cart total overflowed")]
    Overflow,
}

/// One cart entry for a single offer, with a price snapshotted when it was added.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    offer: OfferKey,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Create a new line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if `quantity` is zero.
    pub fn new(
        offer: OfferKey,
        unit_price: Money<'a, Currency>,
        quantity: u32,
    ) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        Ok(Self {
            offer,
            unit_price,
            quantity,
        })
    }

    /// Returns the offer of the line
    pub fn offer(&self) -> OfferKey {
        self.offer
    }

    /// Returns the unit price snapshotted at add-time
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the number of units
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the total leaves the decimal range.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, CartError> {
        let total =
            times(*self.unit_price.amount(), self.quantity).map_err(|_err| CartError::Overflow)?;

        Ok(Money::from_decimal(total, self.unit_price.currency()))
    }
}

/// Cart
///
/// Lines are keyed by offer; ordering carries no meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart<'a> {
    lines: FxHashMap<OfferKey, CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: FxHashMap::default(),
            currency,
        }
    }

    /// Create a cart from existing lines, merging lines for the same offer.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line is in another currency or a merged quantity overflows.
    pub fn with_lines(
        lines: impl IntoIterator<Item = CartLine<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let mut cart = Cart::new(currency);

        for line in lines {
            cart.ensure_currency(&line.unit_price)?;

            match cart.lines.get_mut(&line.offer) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(line.quantity)
                        .ok_or(CartError::Overflow)?;
                }
                None => {
                    cart.lines.insert(line.offer, line);
                }
            }
        }

        Ok(cart)
    }

    /// Add units of an offer, snapshotting its current price if the line is new.
    ///
    /// An existing line keeps its original price and has its quantity increased.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if `quantity` is zero, the offer is in another currency, or the
    /// quantity overflows.
    pub fn add(
        &mut self,
        key: OfferKey,
        offer: &Offer<'a>,
        quantity: u32,
    ) -> Result<&CartLine<'a>, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        self.ensure_currency(offer.price())?;

        let line = self.lines.entry(key).or_insert(CartLine {
            offer: key,
            unit_price: *offer.price(),
            quantity: 0,
        });

        line.quantity = line
            .quantity
            .checked_add(quantity)
            .ok_or(CartError::Overflow)?;

        Ok(line)
    }

    /// Set the quantity of an offer, adding a line if needed. A quantity of zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if the offer is in another currency.
    pub fn set_quantity(
        &mut self,
        key: OfferKey,
        offer: &Offer<'a>,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            self.lines.remove(&key);

            return Ok(());
        }

        self.ensure_currency(offer.price())?;

        self.lines
            .entry(key)
            .and_modify(|line| line.quantity = quantity)
            .or_insert(CartLine {
                offer: key,
                unit_price: *offer.price(),
                quantity,
            });

        Ok(())
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the offer is not in the cart.
    pub fn increment(&mut self, key: OfferKey) -> Result<u32, CartError> {
        let line = self
            .lines
            .get_mut(&key)
            .ok_or(CartError::LineNotFound(key))?;

        line.quantity = line.quantity.checked_add(1).ok_or(CartError::Overflow)?;

        Ok(line.quantity)
    }

    /// Remove one unit from an existing line, dropping the line when it reaches zero.
    ///
    /// Returns the remaining quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if the offer is not in the cart.
    pub fn decrement(&mut self, key: OfferKey) -> Result<u32, CartError> {
        let line = self
            .lines
            .get_mut(&key)
            .ok_or(CartError::LineNotFound(key))?;

        line.quantity = line.quantity.saturating_sub(1);

        let remaining = line.quantity;

        if remaining == 0 {
            self.lines.remove(&key);
        }

        Ok(remaining)
    }

    /// Remove a line entirely.
    pub fn remove(&mut self, key: OfferKey) -> Option<CartLine<'a>> {
        self.lines.remove(&key)
    }

    /// Remove all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Get the line for an offer.
    pub fn get(&self, key: OfferKey) -> Option<&CartLine<'a>> {
        self.lines.get(&key)
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.values()
    }

    /// Number of distinct lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.quantity)).sum()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the total leaves the decimal range.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        let total = self.lines.values().try_fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(*line.line_total()?.amount())
                .ok_or(CartError::Overflow)
        })?;

        Ok(Money::from_decimal(total, self.currency))
    }

    fn ensure_currency(&self, price: &Money<'_, Currency>) -> Result<(), CartError> {
        if price.currency() == self.currency {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch(
                price.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ))
        }
    }
}
