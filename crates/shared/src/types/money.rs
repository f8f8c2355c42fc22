//! Display formatting for monetary amounts.
//!
//! Amounts are `rust_decimal::Decimal` everywhere; floating point never
//! touches a balance. Debts are tracked in a single currency (USD).

use rust_decimal::{Decimal, RoundingStrategy};

/// Formats an amount as US dollars with thousands separators, e.g. `$1,250.50`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{rounded:.2}");
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
