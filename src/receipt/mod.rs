//! Receipt

use std::{fmt::Write, io};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    pricing::{LinePricing, PricingResult},
    products::{OfferKey, ProductKey},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A priced line references a product missing from the catalog.
    #[error("Missing product")]
    MissingProduct(ProductKey),

    /// A priced line references an offer missing from the catalog.
    #[error("Missing offer")]
    MissingOffer(OfferKey),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable summary of a priced cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    /// Priced lines, ordered by offer
    lines: SmallVec<[LinePricing<'a>; 10]>,

    /// Total cost before discounts
    subtotal: Money<'a, Currency>,

    /// Sum of the applied discounts
    total_discount: Money<'a, Currency>,

    /// Amount the customer pays
    due: Money<'a, Currency>,

    /// Currency used for all monetary values
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a pricing result.
    #[must_use]
    pub fn from_pricing(result: &PricingResult<'a>) -> Self {
        Self {
            lines: result.lines().into_iter().cloned().collect(),
            subtotal: result.subtotal(),
            total_discount: result.total_discount(),
            due: result.due(),
            currency: result.currency(),
        }
    }

    /// Total cost before discounts
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Sum of the applied discounts
    #[must_use]
    pub fn total_discount(&self) -> Money<'a, Currency> {
        self.total_discount
    }

    /// Amount due after discounts
    #[must_use]
    pub fn due(&self) -> Money<'a, Currency> {
        self.due
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Priced lines in receipt order.
    #[must_use]
    pub fn lines(&self) -> &[LinePricing<'a>] {
        &self.lines
    }

    /// Total discount as percent points of the subtotal, rounded to two places.
    #[must_use]
    pub fn savings_percent(&self) -> Decimal {
        percent_points(*self.total_discount.amount(), *self.subtotal.amount())
    }

    /// Write the receipt as a table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line cannot be matched to the catalog or writing fails.
    pub fn write_to(&self, mut out: impl io::Write, catalog: &Catalog<'_>) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record([
            "",
            "Product",
            "Seller",
            "Qty",
            "Unit Price",
            "Line Total",
            "Discount",
            "Promotion",
        ]);

        let mut discounted_rows: SmallVec<[usize; 16]> = SmallVec::new();

        for (idx, line) in self.lines.iter().enumerate() {
            let product = catalog
                .product(line.product)
                .ok_or(ReceiptError::MissingProduct(line.product))?;

            let offer = catalog
                .offer(line.offer)
                .ok_or(ReceiptError::MissingOffer(line.offer))?;

            let (discount, promotion) = match line.promotion {
                Some(key) => {
                    discounted_rows.push(idx + 1);

                    let name = catalog
                        .promotion(key)
                        .map_or("<unknown>", |promotion| promotion.name());

                    (format!("-{}", line.discount), name.to_string())
                }
                None => (String::new(), String::new()),
            };

            builder.push_record([
                format!("#{:<3}", idx + 1),
                product.name.clone(),
                offer.seller().to_string(),
                line.quantity.to_string(),
                format!("{}", line.unit_price),
                format!("{}", line.line_total),
                discount,
                promotion,
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..7), Alignment::right());
        table.modify(Columns::new(2..3), color_dark_grey());

        for row in discounted_rows {
            table.modify((row, 6), Color::FG_GREEN);
        }

        let table_str = colorize_borders(&table.to_string());

        writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let rows = [
            (" Subtotal:".to_string(), format!("{}  ", self.subtotal)),
            (
                " Discount:".to_string(),
                format!("({:.2}%) {}  ", self.savings_percent(), self.total_discount),
            ),
            (
                " \x1b[1mDue:\x1b[0m".to_string(),
                format!("\x1b[1m{}  \x1b[0m", self.due),
            ),
        ];

        let label_width = rows
            .iter()
            .map(|(label, _)| visible_width(label))
            .max()
            .unwrap_or_default();

        let value_width = rows
            .iter()
            .map(|(_, value)| visible_width(value))
            .max()
            .unwrap_or_default();

        for (label, value) in &rows {
            let label_pad = label_width.saturating_sub(visible_width(label));
            let value_pad = value_width.saturating_sub(visible_width(value));

            writeln!(
                out,
                "{:>label_pad$}{label}  {}{value}",
                "",
                " ".repeat(value_pad)
            )
            .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

/// `part` as percent points of `whole`, zero when `whole` is zero.
fn percent_points(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }

    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .map_or(Decimal::ZERO, |points| points.round_dp(2))
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in ANSI dark grey.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char != in_run {
            _ = out.write_str(if box_char { "\x1b[90m" } else { "\x1b[0m" });
            in_run = box_char;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Width of a string ignoring ANSI escapes.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            in_escape = !ch.is_ascii_alphabetic();
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        cart::Cart,
        pricing::price_cart,
        products::{Offer, Product},
        promotions::PromotionRecord,
    };

    use super::*;

    fn priced_catalog() -> TestResult<(Catalog<'static>, Cart<'static>)> {
        let mut catalog = Catalog::new(GBP);

        let apple = catalog.insert_product(Product::new("Apple"));
        let pear = catalog.insert_product(Product::new("Pear"));

        let apples = catalog.insert_offer(Offer::new(apple, "Orchard Co", Money::from_minor(5000, GBP)))?;
        let pears = catalog.insert_offer(Offer::new(pear, "Pear Place", Money::from_minor(1200, GBP)))?;

        let mut record = PromotionRecord::new("Apples £10 off", 1, GBP);
        record.fixed_discount = Money::from_minor(1000, GBP);
        record.is_active = true;
        record.products = vec![apple];

        catalog.insert_promotion(record)?;

        let mut cart = Cart::new(GBP);
        cart.add(apples, catalog.offer(apples).ok_or("missing offer")?, 2)?;
        cart.add(pears, catalog.offer(pears).ok_or("missing offer")?, 1)?;

        Ok((catalog, cart))
    }

    #[test]
    fn receipt_mirrors_pricing_totals() -> TestResult {
        let (catalog, cart) = priced_catalog()?;
        let receipt = Receipt::from_pricing(&price_cart(&cart, &catalog)?);

        assert_eq!(receipt.subtotal(), Money::from_minor(11_200, GBP));
        assert_eq!(receipt.total_discount(), Money::from_minor(2000, GBP));
        assert_eq!(receipt.due(), Money::from_minor(9200, GBP));
        assert_eq!(receipt.lines().len(), 2);
        assert_eq!(receipt.savings_percent(), Decimal::new(1786, 2));

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_summary() -> TestResult {
        let (catalog, cart) = priced_catalog()?;
        let receipt = Receipt::from_pricing(&price_cart(&cart, &catalog)?);

        let mut out = Vec::new();
        receipt.write_to(&mut out, &catalog)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Apple"));
        assert!(text.contains("Orchard Co"));
        assert!(text.contains("Apples £10 off"));
        assert!(text.contains("Pear Place"));
        assert!(text.contains("Subtotal:"));
        assert!(text.contains("Due:"));

        Ok(())
    }

    #[test]
    fn write_to_fails_for_delisted_offer() -> TestResult {
        let (mut catalog, cart) = priced_catalog()?;
        let receipt = Receipt::from_pricing(&price_cart(&cart, &catalog)?);

        let offer = receipt.lines().first().ok_or("no lines")?.offer;
        catalog.remove_offer(offer);

        let result = receipt.write_to(&mut Vec::new(), &catalog);

        assert!(matches!(result, Err(ReceiptError::MissingOffer(key)) if key == offer));

        Ok(())
    }

    #[test]
    fn percent_points_of_zero_is_zero() {
        assert_eq!(percent_points(Decimal::ONE, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn visible_width_ignores_escapes() {
        assert_eq!(visible_width("\x1b[1mDue:\x1b[0m"), 4);
    }
}
