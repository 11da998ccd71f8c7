//! Shared cell parsing utilities.
//!
//! Every loader coerces cells through [`to_number`] so sparse and dirty
//! input is treated the same way across datasets.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::RawRow;

/// Placeholders used by the statistics portals for "no data".
const EMPTY_MARKERS: &[&str] = &["-", "—"];

/// Column names that label a year.
static YEAR_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").unwrap_or_else(|_| unreachable!()));

/// Coerces a cell to a number.
///
/// Missing values, empty strings, and dash placeholders are `0`. Anything
/// else is parsed as a number; non-finite or unparseable results are `0`.
#[must_use]
pub fn to_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        None | Some(Value::Null) => return 0.0,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || EMPTY_MARKERS.contains(&trimmed) {
                return 0.0;
            }
            trimmed.parse::<f64>().ok()
        }
        Some(Value::Bool(_) | Value::Array(_) | Value::Object(_)) => None,
    };

    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Returns a string cell, or `None` for missing or non-string cells.
#[must_use]
pub fn text<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}

/// Extracts the year-labeled columns (`"2019"`, `"2020"`, ...) of a row,
/// coerced with [`to_number`].
#[must_use]
pub fn year_values(row: &RawRow) -> BTreeMap<u16, f64> {
    row.iter()
        .filter(|(key, _)| YEAR_COLUMN.is_match(key))
        .filter_map(|(key, value)| Some((key.parse::<u16>().ok()?, to_number(Some(value)))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: &Value) -> RawRow {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn coerces_placeholders_to_zero() {
        assert!(to_number(None).abs() < f64::EPSILON);
        assert!(to_number(Some(&Value::Null)).abs() < f64::EPSILON);
        assert!(to_number(Some(&json!(""))).abs() < f64::EPSILON);
        assert!(to_number(Some(&json!("  "))).abs() < f64::EPSILON);
        assert!(to_number(Some(&json!("-"))).abs() < f64::EPSILON);
        assert!(to_number(Some(&json!("—"))).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_numbers_and_numeric_strings() {
        assert!((to_number(Some(&json!(42))) - 42.0).abs() < f64::EPSILON);
        assert!((to_number(Some(&json!(1.5))) - 1.5).abs() < f64::EPSILON);
        assert!((to_number(Some(&json!(" 1234 "))) - 1234.0).abs() < f64::EPSILON);
        assert!((to_number(Some(&json!("-7"))) + 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_garbage_and_non_finite() {
        assert!(to_number(Some(&json!("1,234"))).abs() < f64::EPSILON);
        assert!(to_number(Some(&json!("n/a"))).abs() < f64::EPSILON);
        assert!(to_number(Some(&json!("inf"))).abs() < f64::EPSILON);
        assert!(to_number(Some(&json!("NaN"))).abs() < f64::EPSILON);
        assert!(to_number(Some(&json!(true))).abs() < f64::EPSILON);
        assert!(to_number(Some(&json!([1]))).abs() < f64::EPSILON);
    }

    #[test]
    fn extracts_only_four_digit_year_columns() {
        let values = year_values(&row(&json!({
            "자치구별(1)": "합계",
            "2019": "10",
            "2020": 20,
            "2021": "-",
            "20210": 99,
            "year": 5
        })));
        assert_eq!(values.len(), 3);
        assert!((values[&2019] - 10.0).abs() < f64::EPSILON);
        assert!((values[&2020] - 20.0).abs() < f64::EPSILON);
        assert!(values[&2021].abs() < f64::EPSILON);
    }
}
