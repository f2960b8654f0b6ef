// src/services/coerce.rs
//! Lenient numeric coercion of upstream JSON values.
//!
//! FMP and Yahoo occasionally report numbers as strings, nulls or placeholder
//! text. Every conversion here returns `None` instead of failing so that a bad
//! field only blanks that field.

use serde_json::Value;

/// A JSON number or numeric string as a finite `f64`.
pub fn to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn opt_f64(value: Option<&Value>) -> Option<f64> {
    value.and_then(to_f64)
}

/// A non-negative integral count, e.g. shares outstanding.
pub fn to_u64(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    to_f64(value)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u64::MAX as f64)
        .map(|v| v as u64)
}

/// A non-empty, trimmed string.
pub fn to_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Expands Yahoo's abbreviated magnitudes: `15.12B` -> 15_120_000_000.
pub fn parse_abbreviated(text: &str) -> Option<u64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let last = cleaned.chars().last()?;
    let (number, multiplier) = match last.to_ascii_uppercase() {
        'K' => (&cleaned[..cleaned.len() - 1], 1e3),
        'M' => (&cleaned[..cleaned.len() - 1], 1e6),
        'B' => (&cleaned[..cleaned.len() - 1], 1e9),
        'T' => (&cleaned[..cleaned.len() - 1], 1e12),
        _ => (cleaned.as_str(), 1.0),
    };
    let value = number.trim().parse::<f64>().ok()? * multiplier;
    if value.is_finite() && value >= 0.0 {
        Some(value.round() as u64)
    } else {
        None
    }
}
