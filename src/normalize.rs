use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use tracing::trace;

use crate::config::ColumnConfig;
use crate::models::{BucketKey, CellValue, RawRecord};

/// Extracts the bucket key of one row, or `None` when the row is unusable.
///
/// A required cell that is absent, blank, zero or empty text rejects the row.
/// Week and year values are not validated beyond that and end up in the key
/// as they were written.
pub fn normalize(record: &RawRecord, columns: &ColumnConfig) -> Option<BucketKey> {
    match columns {
        ColumnConfig::Weekly {
            year_column,
            week_column,
            ..
        } => {
            let year = truthy_cell(record, year_column)?;
            let week = truthy_cell(record, week_column)?;
            Some(BucketKey::Week {
                year: year.clone(),
                week: week.clone(),
            })
        }
        ColumnConfig::Daily {
            date_column,
            date_formats,
        } => {
            let cell = truthy_cell(record, date_column)?;
            let date = parse_date(cell, date_formats);
            if date.is_none() {
                trace!(value = %cell, "unparseable date");
            }
            date.map(BucketKey::Date)
        }
    }
}

fn truthy_cell<'a>(record: &'a RawRecord, column: &str) -> Option<&'a CellValue> {
    record.get(column).filter(|cell| cell.is_truthy())
}

// Serial 61 is 1900-03-01, the first day past the phantom 1900-02-29.
const FIRST_SERIAL: f64 = 61.0;
// Serial of 9999-12-31.
const LAST_SERIAL: f64 = 2_958_465.0;

/// Text is RFC 3339 (reduced to its UTC date) or one of `formats`. Numbers are
/// matched against `formats` first (`20230501` with `%Y%m%d`), then read as
/// spreadsheet serial days.
pub fn parse_date(cell: &CellValue, formats: &[String]) -> Option<NaiveDate> {
    match cell {
        CellValue::Empty => None,
        CellValue::Number(serial) => {
            parse_with_formats(&cell.to_string(), formats).or_else(|| from_serial(*serial))
        }
        CellValue::Text(text) => {
            if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
                return Some(stamp.with_timezone(&Utc).date_naive());
            }
            parse_with_formats(text, formats)
        }
    }
}

fn parse_with_formats(text: &str, formats: &[String]) -> Option<NaiveDate> {
    formats.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(text, format)
            .map(|stamp| stamp.date())
            .or_else(|_| NaiveDate::parse_from_str(text, format))
            .ok()
    })
}

fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(FIRST_SERIAL..=LAST_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = Duration::try_days(serial.trunc() as i64)?;
    epoch.checked_add_signed(days)
}
