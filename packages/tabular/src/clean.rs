//! Cell normalization for decoded spreadsheet rows.
//!
//! The pass is deliberately destructive: a numeric-looking string becomes
//! a number and its original spelling is gone ("007" reads back as 7).
//! Running the pass a second time is a no-op, which the tests pin down.

use censo_map_census_models::SheetRow;
use serde_json::Value;

/// Cleans every row and drops the ones left with no content.
///
/// Per row: column headers are trimmed, string cells are trimmed, and a
/// trimmed cell that parses entirely as a finite decimal number is
/// replaced by that number. A row survives only if at least one cell is
/// neither empty-string nor null. Surviving rows keep their input order.
#[must_use]
pub fn clean_rows(rows: Vec<SheetRow>) -> Vec<SheetRow> {
    rows.into_iter()
        .map(clean_row)
        .filter(row_has_content)
        .collect()
}

fn clean_row(row: SheetRow) -> SheetRow {
    row.into_iter()
        .map(|(key, value)| (key.trim().to_owned(), clean_value(value)))
        .collect()
}

/// Cleans a single cell: trims strings and coerces fully-numeric ones.
/// Non-string cells pass through untouched, which makes the pass
/// idempotent: a number never changes again.
#[must_use]
pub fn clean_value(value: Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if let Some(n) = parse_decimal(trimmed) {
                number_value(n)
            } else if trimmed.len() == s.len() {
                Value::String(s)
            } else {
                Value::String(trimmed.to_owned())
            }
        }
        other => other,
    }
}

/// Parses a string that is, in its entirety, a finite decimal number.
/// Empty strings and partial matches ("42kg") are rejected.
fn parse_decimal(s: &str) -> Option<f64> {
    if s.is_empty() {
        return None;
    }
    let n: f64 = s.parse().ok()?;
    n.is_finite().then_some(n)
}

/// Builds a JSON number, preferring the integer representation when the
/// value has no fractional part.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && (i64::MIN as f64..=i64::MAX as f64).contains(&n) {
        Value::Number(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn row_has_content(row: &SheetRow) -> bool {
    row.values().any(|value| match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> SheetRow {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn trims_keys_and_values() {
        let rows = clean_rows(vec![row(&[(" Municípios ", json!("  Açailândia  "))])]);
        assert_eq!(rows[0]["Municípios"], json!("Açailândia"));
    }

    #[test]
    fn coerces_fully_numeric_strings() {
        let rows = clean_rows(vec![row(&[
            ("a", json!("42")),
            ("b", json!(" 42 ")),
            ("c", json!("42kg")),
            ("d", json!("007")),
            ("e", json!("4.5")),
        ])]);
        assert_eq!(rows[0]["a"], json!(42));
        assert_eq!(rows[0]["b"], json!(42));
        assert_eq!(rows[0]["c"], json!("42kg"));
        assert_eq!(rows[0]["d"], json!(7));
        assert_eq!(rows[0]["e"], json!(4.5));
    }

    #[test]
    fn rejects_non_finite_coercions() {
        let rows = clean_rows(vec![row(&[("a", json!("inf")), ("b", json!("NaN"))])]);
        assert_eq!(rows[0]["a"], json!("inf"));
        assert_eq!(rows[0]["b"], json!("NaN"));
    }

    #[test]
    fn drops_rows_with_no_content() {
        let rows = clean_rows(vec![
            row(&[("a", json!("")), ("b", json!("  ")), ("c", Value::Null)]),
            row(&[("a", json!("")), ("b", json!("x"))]),
            row(&[("a", json!(0))]),
        ]);
        // First row is all-empty after trimming and disappears; a zero
        // cell still counts as content.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["b"], json!("x"));
        assert_eq!(rows[1]["a"], json!(0));
    }

    #[test]
    fn empty_cell_survives_in_a_non_empty_row() {
        let rows = clean_rows(vec![row(&[("a", json!("")), ("b", json!("kept"))])]);
        assert_eq!(rows[0]["a"], json!(""));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let input = vec![
            row(&[
                (" Municípios ", json!(" Açailândia ")),
                ("CD_MUN", json!("2100055")),
                ("nota", json!("42kg")),
            ]),
            row(&[("x", json!(""))]),
        ];
        let once = clean_rows(input);
        let twice = clean_rows(once.clone());
        assert_eq!(once, twice);
    }
}
