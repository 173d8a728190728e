//! Calendar-date normalization for the heterogeneous date representations
//! found in claims exports: spreadsheet serial numbers, several fixed string
//! formats, and ISO-like datetime strings.

use chrono::{Duration, NaiveDate};

use crate::models::CellValue;

/// Fixed-format parse attempts, in priority order. First match wins.
///
/// Ambiguous strings such as `01/02/2024` therefore resolve as `%m/%d/%Y`
/// (January 2nd), not by locale detection. Existing reports were built on
/// this order; keep it.
const DATE_FORMATS: [&str; 4] = ["%d-%m-%Y", "%m/%d/%Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Datetime fallbacks for ISO-like strings that carry a time component.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an arbitrary raw cell into a calendar date.
///
/// * Empty cells → `None`.
/// * Numbers greater than 1 are spreadsheet serial dates counted from
///   1899-12-30; the fractional part is time-of-day and is truncated.
/// * Text is stripped of any trailing time-of-day component (everything
///   after the first space) and tried against [`DATE_FORMATS`] in order,
///   then against the ISO datetime fallbacks.
///
/// Returns `None` for anything unparseable; never errors or panics.
pub fn normalize_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => serial_to_date(*n),
        CellValue::Text(s) => parse_text(s),
    }
}

/// Convert a spreadsheet serial number to a date.
///
/// Serial 1 maps to 1899-12-31; the epoch sits two days before 1900-01-01 to
/// absorb the fictitious 1900-02-29 that spreadsheet applications inherited
/// from Lotus 1-2-3.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0) as i64;
    epoch
        .checked_add_signed(Duration::milliseconds(millis))
        .map(|dt| dt.date())
}

fn parse_text(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Datetime strings like "01-02-2024 14:30" keep only the date part.
    let date_part = trimmed.split(' ').next().unwrap_or(trimmed);

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            return Some(date);
        }
    }

    iso_fallback(trimmed)
}

/// Last-ditch parse for ISO-8601 strings the fixed formats miss.
fn iso_fallback(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    None
}
