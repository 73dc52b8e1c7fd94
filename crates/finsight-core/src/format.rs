//! Currency formatting for presentation layers

use rust_decimal::{Decimal, RoundingStrategy};

/// Default currency prefix
pub const DEFAULT_CURRENCY: &str = "Rp";

/// Format an amount with thousands separators and no decimals
///
/// `format_currency(dec!(-1234567.5), "Rp")` gives `"Rp -1,234,568"`.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    if currency.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{} {}{}", currency, sign, grouped)
    }
}
