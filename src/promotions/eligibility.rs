//! Whole-cart Eligibility
//!
//! Whether a cart meets a whole-cart promotion's thresholds. The quantity threshold counts
//! distinct lines, not units.

use rusty_money::{Money, iso::Currency};

use crate::promotions::types::WholeCartDiscount;

/// Return whether a cart with `distinct_line_count` lines and `subtotal` qualifies for `promo`.
///
/// A promotion with neither threshold set never qualifies. When both are set both must hold.
pub fn is_cart_eligible(
    distinct_line_count: usize,
    subtotal: &Money<'_, Currency>,
    promo: &WholeCartDiscount<'_>,
) -> bool {
    let min_amount = promo.min_amount().amount();
    let has_amount = !min_amount.is_zero();
    let has_quantity = promo.min_quantity() != 0;

    let meets_amount = || subtotal.amount() >= min_amount;
    let meets_quantity = || {
        u32::try_from(distinct_line_count).map_or(true, |count| count >= promo.min_quantity())
    };

    match (has_quantity, has_amount) {
        (false, false) => false,
        (true, true) => meets_quantity() && meets_amount(),
        (false, true) => meets_amount(),
        (true, false) => meets_quantity(),
    }
}
