use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single decoded spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Classifies raw cell text the way a spreadsheet decoder types its cells.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Number(value),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    /// Blank cells, zero and empty text all count as missing.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Number(value) => *value != 0.0 && !value.is_nan(),
            CellValue::Text(text) => !text.is_empty(),
        }
    }

    /// Integer reading of the cell: numbers are truncated, text keeps its
    /// leading integer (`"12a"` is 12, `"a12"` has none).
    pub fn ordinal(&self) -> Option<i64> {
        match self {
            CellValue::Empty => None,
            CellValue::Number(value) if value.is_finite() => Some(value.trunc() as i64),
            CellValue::Number(_) => None,
            CellValue::Text(text) => leading_integer(text),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(value) => f.write_str(&format_number(*value)),
            CellValue::Text(text) => f.write_str(text),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(idx, _)| idx)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

/// One spreadsheet row keyed by header name.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    cells: HashMap<String, CellValue>,
}

impl RawRecord {
    /// `None` when the row has no such column at all.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    Weekly,
    Daily,
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveType::Weekly => f.write_str("weekly"),
            CurveType::Daily => f.write_str("daily"),
        }
    }
}

/// Canonical identifier of one time unit.
#[derive(Debug, Clone, PartialEq)]
pub enum BucketKey {
    Week { year: CellValue, week: CellValue },
    Date(NaiveDate),
}

impl BucketKey {
    pub fn label(&self) -> String {
        match self {
            BucketKey::Week { week, .. } => format!("W{week}"),
            BucketKey::Date(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Week { year, week } => write!(f, "{year}-W{week}"),
            BucketKey::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedBucket {
    #[serde(skip)]
    pub key: BucketKey,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedBucket {
    pub label: String,
    pub count: u64,
    pub exceeds_action: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub en: String,
    pub bm: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_cells_are_typed_like_a_spreadsheet() {
        assert_eq!(CellValue::from_raw("  "), CellValue::Empty);
        assert_eq!(CellValue::from_raw("12"), CellValue::Number(12.0));
        assert_eq!(CellValue::from_raw(" 2023-05-01 "), CellValue::Text("2023-05-01".to_string()));
        assert_eq!(CellValue::from_raw("NaN"), CellValue::Text("NaN".to_string()));
    }

    #[test]
    fn falsy_cells_match_missing_rule() {
        assert!(!CellValue::Empty.is_truthy());
        assert!(!CellValue::Number(0.0).is_truthy());
        assert!(!CellValue::Text(String::new()).is_truthy());
        assert!(CellValue::Number(3.0).is_truthy());
        assert!(CellValue::Text("0".to_string()).is_truthy());
    }

    #[test]
    fn numbers_render_without_trailing_fraction() {
        assert_eq!(CellValue::Number(5.0).to_string(), "5");
        assert_eq!(CellValue::Number(5.5).to_string(), "5.5");
        assert_eq!(CellValue::Number(-2.0).to_string(), "-2");
    }

    #[test]
    fn ordinal_reads_leading_integer() {
        assert_eq!(CellValue::Number(7.9).ordinal(), Some(7));
        assert_eq!(CellValue::Text("12a".to_string()).ordinal(), Some(12));
        assert_eq!(CellValue::Text("-3".to_string()).ordinal(), Some(-3));
        assert_eq!(CellValue::Text("W12".to_string()).ordinal(), None);
        assert_eq!(CellValue::Empty.ordinal(), None);
    }

    #[test]
    fn week_key_serializes_year_and_week() {
        let key = BucketKey::Week {
            year: CellValue::Number(2023.0),
            week: CellValue::Number(5.0),
        };
        assert_eq!(key.to_string(), "2023-W5");
        assert_eq!(key.label(), "W5");
    }

    #[test]
    fn date_key_uses_iso_form() {
        let date = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
        let key = BucketKey::Date(date);
        assert_eq!(key.to_string(), "2023-05-01");
        assert_eq!(key.label(), "2023-05-01");
    }

    #[test]
    fn record_distinguishes_absent_columns() {
        let record: RawRecord = [("a", CellValue::Empty)].into_iter().collect();
        assert_eq!(record.get("a"), Some(&CellValue::Empty));
        assert_eq!(record.get("b"), None);
    }
}
