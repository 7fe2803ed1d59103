//! Scalar helpers for cell values.
//!
//! Normalized cells are `serde_json::Value`s: numbers after coercion,
//! strings otherwise. The join key may arrive as either representation on
//! either side, so comparisons go through an explicit canonical form
//! instead of any loose equality.

use serde_json::Value;

use crate::SheetRow;

/// Parses a municipality code from a cell that may hold a number or a
/// numeric string. Fractional values are rejected: IBGE codes are integers.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            (f.fract() == 0.0 && f.is_finite()).then_some(f as i64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<i64>().ok().or_else(|| {
                let f: f64 = trimmed.parse().ok()?;
                (f.fract() == 0.0 && f.is_finite()).then_some(f as i64)
            })
        }
        _ => None,
    }
}

/// Parses a cell as a floating-point number, from either representation.
#[must_use]
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a counter column, treating anything non-numeric as zero the way
/// the dashboard's `parseInt(x || 0)` did.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn count_field(row: &SheetRow, column: &str) -> u64 {
    row.get(column)
        .and_then(parse_number)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map_or(0, |n| n as u64)
}

/// Returns the trimmed string form of a cell, or `None` when the cell is
/// empty or not text.
#[must_use]
pub fn as_trimmed_str(value: &Value) -> Option<&str> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then_some(s)
}

/// JavaScript-style truthiness for property values: absent, `null`, empty
/// string, and zero all count as missing.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
