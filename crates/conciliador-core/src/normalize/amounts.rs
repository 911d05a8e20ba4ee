//! Amount parsing for mixed Argentine and international notation.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a locale-formatted amount (e.g. "1.800.000,00", "1,234.56", "$ 150").
///
/// The sign is kept: a leading or trailing `-`, or surrounding parentheses,
/// yield a negative value. Returns `None` when no digits are present.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    let negative = trimmed.starts_with('-')
        || trimmed.ends_with('-')
        || (trimmed.starts_with('(') && trimmed.ends_with(')'));

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // Both present: the right-most one is the decimal separator
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(c), None) => single_separator(&cleaned, ',', c),
        (None, Some(d)) => single_separator(&cleaned, '.', d),
        (None, None) => cleaned,
    };

    let normalized = normalized.trim_end_matches('.');
    let value = Decimal::from_str(normalized).ok()?;

    Some(if negative { -value } else { value })
}

/// Resolve a string that uses only one kind of separator.
///
/// The last separator is decimal when exactly two digits follow it, or when
/// it is a lone dot not followed by a group of three. Everything else is
/// digit grouping.
fn single_separator(cleaned: &str, sep: char, last: usize) -> String {
    let tail = cleaned.len() - last - 1;
    let occurrences = cleaned.matches(sep).count();

    let is_decimal = tail == 2 || (sep == '.' && occurrences == 1 && tail != 3);

    if is_decimal {
        let (int_part, frac_part) = cleaned.split_at(last);
        format!("{}.{}", int_part.replace(sep, ""), &frac_part[1..])
    } else {
        cleaned.replace(sep, "")
    }
}

/// Canonical machine form: plain digits, `.` decimal point, two places.
///
/// Re-parsing the output with [`parse_amount`] yields the same value.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Display form used in Argentine documents (1.234,56).
pub fn format_display_amount(amount: Decimal) -> String {
    let s = format_amount(amount.abs());
    let parts: Vec<&str> = s.split('.').collect();
    let integer_part = parts[0];
    let decimal_part = parts.get(1).unwrap_or(&"00");

    let mut result = String::new();
    for (i, c) in integer_part.chars().enumerate() {
        if i > 0 && (integer_part.len() - i) % 3 == 0 {
            result.push('.');
        }
        result.push(c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}{result},{decimal_part}")
}
