//! Pricing
//!
//! Computes per-line discounts, the total discount and the amount due for a cart.
//!
//! Each line gets the single largest discount among the promotions that apply to its product;
//! overlapping promotions never stack. Whole-cart promotions compete with product promotions
//! on the same terms once the cart meets their thresholds.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{Span, debug};

use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{CatalogError, PromotionCatalog},
    discounts::DiscountError,
    products::{OfferKey, ProductKey},
    promotions::{PromotionKey, PromotionKind, eligibility::is_cart_eligible},
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A catalog lookup failed, typically an offer delisted after it was added to the cart.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A discount handler failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Cart totals could not be calculated.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Summing discounts left the decimal range.
    #[error("pricing arithmetic overflowed")]
    Overflow,
}

/// Pricing details for one cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePricing<'a> {
    /// Offer of the line
    pub offer: OfferKey,

    /// Product the offer lists
    pub product: ProductKey,

    /// Units in the line
    pub quantity: u32,

    /// Unit price snapshotted in the cart
    pub unit_price: Money<'a, Currency>,

    /// Unit price multiplied by quantity
    pub line_total: Money<'a, Currency>,

    /// Applied (largest) discount
    pub discount: Money<'a, Currency>,

    /// Promotion that gave the applied discount, if it was non-zero
    pub promotion: Option<PromotionKey>,
}

impl<'a> LinePricing<'a> {
    /// Line total less the applied discount.
    pub fn net_total(&self) -> Money<'a, Currency> {
        Money::from_decimal(
            self.line_total.amount() - self.discount.amount(),
            self.line_total.currency(),
        )
    }
}

/// Totals for a priced cart.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult<'a> {
    currency: &'static Currency,
    subtotal: Money<'a, Currency>,
    total_discount: Money<'a, Currency>,
    due: Money<'a, Currency>,
    lines: FxHashMap<OfferKey, LinePricing<'a>>,
}

impl<'a> PricingResult<'a> {
    /// Total before discounts
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Sum of the applied line discounts
    pub fn total_discount(&self) -> Money<'a, Currency> {
        self.total_discount
    }

    /// Subtotal less total discount
    pub fn due(&self) -> Money<'a, Currency> {
        self.due
    }

    /// Currency used for all monetary values
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Pricing for the line holding `offer`.
    pub fn line(&self, offer: OfferKey) -> Option<&LinePricing<'a>> {
        self.lines.get(&offer)
    }

    /// All line pricings, ordered by offer key.
    pub fn lines(&self) -> Vec<&LinePricing<'a>> {
        let mut lines: Vec<_> = self.lines.values().collect();

        lines.sort_by_key(|line| line.offer);

        lines
    }

    /// Whether discounts exceed the subtotal, which only a misconfigured promotion can cause.
    pub fn is_overdiscounted(&self) -> bool {
        self.due.amount().is_sign_negative() && !self.due.amount().is_zero()
    }
}

/// Price a cart against a catalog snapshot.
///
/// # Errors
///
/// - [`PricingError::Catalog`]: an offer in the cart is no longer in the catalog.
/// - [`PricingError::Discount`]: a promotion amount is in another currency, or overflow.
/// - [`PricingError::Cart`] / [`PricingError::Overflow`]: totals left the decimal range.
#[tracing::instrument(
    name = "pricing.price_cart",
    skip_all,
    fields(
        lines = cart.len(),
        subtotal = tracing::field::Empty,
        total_discount = tracing::field::Empty,
        due = tracing::field::Empty
    ),
    err
)]
pub fn price_cart<'a, C>(cart: &Cart<'a>, catalog: &C) -> Result<PricingResult<'a>, PricingError>
where
    C: PromotionCatalog<'a> + ?Sized,
{
    let currency = cart.currency();
    let subtotal = cart.subtotal()?;
    let mut pricer = LinePricer {
        distinct_lines: cart.len(),
        subtotal,
        eligibility: FxHashMap::default(),
    };

    let mut lines = FxHashMap::default();
    let mut total_discount = Decimal::ZERO;

    for line in cart.iter() {
        let priced = pricer.price_line(line, catalog)?;

        total_discount = total_discount
            .checked_add(*priced.discount.amount())
            .ok_or(PricingError::Overflow)?;

        lines.insert(priced.offer, priced);
    }

    let due = subtotal
        .amount()
        .checked_sub(total_discount)
        .ok_or(PricingError::Overflow)?;

    let result = PricingResult {
        currency,
        subtotal,
        total_discount: Money::from_decimal(total_discount, currency),
        due: Money::from_decimal(due, currency),
        lines,
    };

    let span = Span::current();

    span.record("subtotal", tracing::field::display(result.subtotal));
    span.record("total_discount", tracing::field::display(result.total_discount));
    span.record("due", tracing::field::display(result.due));

    Ok(result)
}

/// Per-run state: cart-level figures and whole-cart eligibility, decided once per promotion.
struct LinePricer<'a> {
    distinct_lines: usize,
    subtotal: Money<'a, Currency>,
    eligibility: FxHashMap<PromotionKey, bool>,
}

impl<'a> LinePricer<'a> {
    fn price_line<C>(
        &mut self,
        line: &CartLine<'a>,
        catalog: &C,
    ) -> Result<LinePricing<'a>, PricingError>
    where
        C: PromotionCatalog<'a> + ?Sized,
    {
        let product = catalog.product_for_offer(line.offer())?;
        let currency = line.unit_price().currency();

        let distinct_lines = self.distinct_lines;
        let subtotal = self.subtotal;

        let mut applied: Option<(Decimal, PromotionKey)> = None;

        for promotion in catalog.promotions_for_product(product) {
            let amount = match promotion.kind() {
                PromotionKind::WholeCart(rule) => {
                    let eligible = *self
                        .eligibility
                        .entry(promotion.key())
                        .or_insert_with(|| is_cart_eligible(distinct_lines, &subtotal, rule));

                    if eligible {
                        *promotion.discount(line)?.amount()
                    } else {
                        Decimal::ZERO
                    }
                }
                _ => *promotion.discount(line)?.amount(),
            };

            if applied.is_none_or(|(best, _)| amount > best) {
                applied = Some((amount, promotion.key()));
            }
        }

        let (discount, promotion) = match applied {
            Some((amount, key)) => (amount, (amount > Decimal::ZERO).then_some(key)),
            None => (Decimal::ZERO, None),
        };

        let discount = Money::from_decimal(discount, currency);

        debug!(
            offer = ?line.offer(),
            quantity = line.quantity(),
            %discount,
            ?promotion,
            "priced line"
        );

        Ok(LinePricing {
            offer: line.offer(),
            product,
            quantity: line.quantity(),
            unit_price: *line.unit_price(),
            line_total: line.line_total()?,
            discount,
            promotion,
        })
    }
}
