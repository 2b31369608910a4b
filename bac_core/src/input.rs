//! Permissive parsing of user-entered numbers.
//!
//! Users type numbers with either a comma or a period as the decimal
//! separator. Drink fields degrade to `0.0` on bad input; weight parsing
//! returns `None` so the caller keeps its last valid value.

use crate::{Sex, WeightBounds};

/// Parse a decimal number, accepting `,` as the decimal separator
pub fn parse_decimal(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    if normalized.is_empty() {
        return None;
    }

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a drink volume or strength field
///
/// Unparsable or negative input counts as `0.0`.
pub fn drink_amount(text: &str) -> f64 {
    match parse_decimal(text) {
        Some(v) if v >= 0.0 => v,
        Some(v) => {
            tracing::warn!("Negative drink amount {} treated as 0", v);
            0.0
        }
        None => {
            if !text.trim().is_empty() {
                tracing::warn!("Unparsable drink amount {:?} treated as 0", text);
            }
            0.0
        }
    }
}

/// Parse a body weight in kilograms, rejecting values outside `bounds`
pub fn parse_weight(text: &str, bounds: &WeightBounds) -> Option<f64> {
    let weight = parse_decimal(text)?;
    if bounds.contains(weight) {
        Some(weight)
    } else {
        tracing::warn!(
            "Weight {} kg outside {}..={} kg",
            weight,
            bounds.min_kg,
            bounds.max_kg
        );
        None
    }
}

/// Parse a sex label, `None` when unrecognized
pub fn parse_sex(text: &str) -> Option<Sex> {
    text.parse().ok()
}
