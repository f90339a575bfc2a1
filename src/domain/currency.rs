//! Brazilian Real display formatting (`R$ 1.234,50`).

use rust_decimal::{Decimal, RoundingStrategy};

const SYMBOL: &str = "R$";
const THOUSANDS_SEPARATOR: char = '.';
const DECIMAL_SEPARATOR: char = ',';

/// Formats `amount` as BRL with two fraction digits.
///
/// Cents are rounded half away from zero on the exact value of `amount`.
/// Negative values put the minus sign before the symbol (`-R$ 5,00`);
/// values that round to zero are unsigned. Non-finite input is rendered as
/// `R$ NaN`, `R$ ∞` or `-R$ ∞` instead of failing.
pub fn format_brl(amount: f64) -> String {
    if amount.is_nan() {
        return format!("{} NaN", SYMBOL);
    }
    if amount.is_infinite() {
        let sign = if amount < 0.0 { "-" } else { "" };
        return format!("{}{} ∞", sign, SYMBOL);
    }

    let fixed = round_to_cents(amount.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let is_zero = integer.bytes().all(|b| b == b'0') && fraction.bytes().all(|b| b == b'0');
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };

    format!(
        "{}{} {}{}{}",
        sign,
        SYMBOL,
        group_thousands(integer),
        DECIMAL_SEPARATOR,
        fraction
    )
}

fn round_to_cents(amount: f64) -> String {
    match Decimal::from_f64_retain(amount) {
        Some(exact) => {
            let mut cents =
                exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            cents.rescale(2);
            cents.to_string()
        }
        // Beyond Decimal's range there are no fractional digits left to round.
        None => format!("{:.2}", amount),
    }
}

fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(c);
    }
    grouped
}
