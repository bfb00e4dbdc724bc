//! Token and fiat amount formatting.
//!
//! On-chain amounts are integers scaled by `10^decimals`. Reports show them
//! with two decimals (truncated, never rounded up) and comma thousands
//! separators: `4000 * 10^18` at 18 decimals is `4,000.00`.

use crate::error::{FolioError, Result};

/// Sum of on-chain amounts, refusing totals that do not fit an `i128`.
pub fn sum_amounts(amounts: impl IntoIterator<Item = i128>) -> Result<i128> {
    amounts.into_iter().try_fold(0i128, |total, amount| {
        total
            .checked_add(amount)
            .ok_or_else(|| FolioError::Data(format!("amount total overflows: {} + {}", total, amount)))
    })
}

/// Format a scaled integer amount with two decimals.
pub fn format_value(amount: i128, decimals: u32) -> String {
    let scale = scale(decimals);
    let abs = amount.unsigned_abs();
    let whole = abs / scale;
    let cents = (abs % scale) * 100 / scale;

    let mut out = String::new();
    if amount < 0 && (whole > 0 || cents > 0) {
        out.push('-');
    }
    out.push_str(&group_thousands(&whole.to_string()));
    out.push('.');
    out.push_str(&format!("{:02}", cents));
    out
}

/// Inverse of [`format_value`]: `"-1,234.5"` back to a scaled integer.
/// `None` for anything that is not a plain decimal number or has more
/// fraction digits than `decimals`.
pub fn parse_value(text: &str, decimals: u32) -> Option<i128> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let digits: String = digits.chars().filter(|c| *c != ',').collect();
    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits.as_str(), ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    if fraction.len() > decimals as usize {
        return None;
    }

    let scale = i128::try_from(scale(decimals)).ok()?;
    let whole: i128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut value = whole.checked_mul(scale)?;
    if !fraction.is_empty() {
        let frac: i128 = fraction.parse().ok()?;
        let frac_scale = 10i128.checked_pow(decimals - fraction.len() as u32)?;
        value = value.checked_add(frac.checked_mul(frac_scale)?)?;
    }
    Some(if negative { -value } else { value })
}

/// Scaled integer to a float, for fiat conversion only.
pub fn value_to_float(amount: i128, decimals: u32) -> f64 {
    amount as f64 / 10f64.powi(decimals as i32)
}

/// Fiat amount with the currency symbol in front: `$1,234.56`, `-$0.50`.
pub fn format_fiat(value: f64, symbol: &str) -> String {
    let cents = (value.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc() as u128;
    let rest = (cents % 100.0) as u128;
    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    format!(
        "{}{}{}.{:02}",
        sign,
        symbol,
        group_thousands(&whole.to_string()),
        rest
    )
}

/// Upper-case name with the registered mark the platform uses for handles.
pub fn handle(name: &str) -> String {
    format!("{}\u{00AE}", name.to_uppercase())
}

fn scale(decimals: u32) -> u128 {
    10u128.checked_pow(decimals).unwrap_or(u128::MAX)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
