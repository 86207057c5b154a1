//! Display formatting for user-visible values.
//!
//! All monetary values render with the es-ES EUR convention (thousands `.`,
//! decimal `,`, two decimals, trailing ` €`), percentages with one decimal,
//! and dates as `DD/MM/YYYY` in the transaction table or `DD/MM/YY` on chart
//! axes. These functions are the reference for golden-output tests.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount with the es-ES EUR convention.
///
/// Rounds to two decimals with midpoints away from zero, the same direction
/// the dashboard's currency fields round.
///
/// # Examples
///
/// ```
/// use caudal_core::format_eur;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_eur(dec!(1234.56)), "1.234,56 €");
/// assert_eq!(format_eur(dec!(0)), "0,00 €");
/// assert_eq!(format_eur(dec!(-40)), "-40,00 €");
/// ```
#[must_use]
pub fn format_eur(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut out = String::with_capacity(plain.len() + 6);
    if negative {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out.push(',');
    out.push_str(frac_part);
    out.push_str(" €");
    out
}

/// Format a percentage with one decimal, e.g. `-50.0%`.
///
/// The decimal separator stays a dot, matching the dashboard's margin field.
#[must_use]
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Transaction-table date rendering, `DD/MM/YYYY`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Compact date for chart axis labels, `DD/MM/YY`.
#[must_use]
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%d/%m/%y").to_string()
}
