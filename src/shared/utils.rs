//! Utility functions and helpers

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a marketplace price string into a positive decimal.
///
/// Marketplaces render prices as `"1,612.50"` or `"1,612.50 NGN"`; the first
/// token is taken and thousands separators are dropped. Zero, negative and
/// unparseable prices yield `None`.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let token = raw.split_whitespace().next()?;
    let cleaned: String = token.chars().filter(|c| *c != ',').collect();

    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;

    if value > Decimal::ZERO {
        Some(value.normalize())
    } else {
        None
    }
}

/// Canonical form of a currency code ("ngn " -> "NGN")
pub fn normalize_currency(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Normalize and dedupe currency codes, keeping first-seen order
pub fn dedupe_currencies<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for code in codes {
        let code = normalize_currency(code.as_ref());
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
