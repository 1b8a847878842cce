//! Date coercion
//! ISO-8601 first, then a fixed, ordered list of explicit patterns.

use crate::types::CellValue;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Explicit patterns in precedence order. The regex guards the shape (digit
/// counts, separators, three-letter month) so a 4-digit-year pattern never
/// accepts a 2-digit year; chrono then checks the calendar.
const PATTERNS: &[(&str, &str)] = &[
    (r"^\d{1,2}-[A-Z]{3}-\d{4}$", "%d-%b-%Y"),
    (r"^\d{1,2}-[A-Z]{3}-\d{2}$", "%d-%b-%y"),
    (r"^\d{1,2} [A-Z]{3} \d{4}$", "%d %b %Y"),
    (r"^\d{1,2} [A-Z]{3} \d{2}$", "%d %b %y"),
    (r"^\d{1,2}/[A-Z]{3}/\d{4}$", "%d/%b/%Y"),
    (r"^\d{4}-\d{1,2}-\d{1,2}$", "%Y-%m-%d"),
    (r"^\d{4}/\d{1,2}/\d{1,2}$", "%Y/%m/%d"),
    (r"^\d{1,2}/\d{1,2}/\d{4}$", "%m/%d/%Y"),
    (r"^\d{1,2}/\d{1,2}/\d{2}$", "%m/%d/%y"),
    (r"^\d{1,2}/\d{1,2}/\d{4}$", "%d/%m/%Y"),
    (r"^\d{1,2}/\d{1,2}/\d{2}$", "%d/%m/%y"),
];

static COMPILED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    PATTERNS
        .iter()
        .filter_map(|(guard, fmt)| Regex::new(guard).ok().map(|re| (re, *fmt)))
        .collect()
});

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Coerce a raw cell into a date.
///
/// Native dates pass through, native date-times truncate to their date, and
/// strings go through [`parse_date_str`].
pub fn parse_date(raw: &CellValue) -> Result<NaiveDate, String> {
    match raw {
        CellValue::Empty => Err("empty date".to_string()),
        CellValue::Date(d) => Ok(*d),
        CellValue::DateTime(dt) => Ok(dt.date()),
        CellValue::Text(s) if s.trim().is_empty() => Err("empty date".to_string()),
        other => parse_date_str(&other.to_string())
            .ok_or_else(|| format!("invalid date value {}", other.describe())),
    }
}

/// Parse a date string: ISO-8601 date or date-time (date component kept),
/// then the explicit patterns against the upper-cased input.
pub fn parse_date_str(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = parse_iso(s) {
        return Some(date);
    }

    let upper = s.to_uppercase();
    COMPILED
        .iter()
        .filter(|(guard, _)| guard.is_match(&upper))
        .find_map(|(_, fmt)| {
            let date = NaiveDate::parse_from_str(&upper, fmt).ok()?;
            Some(if fmt.contains("%y") { pivot_two_digit_year(date) } else { date })
        })
}

/// Two-digit years 69..=99 fall in the 1900s, 00..=68 in the 2000s. chrono
/// pivots one year later, so only `69` needs moving back a century.
fn pivot_two_digit_year(date: NaiveDate) -> NaiveDate {
    if date.year() == 2069 {
        date.with_year(1969).unwrap_or(date)
    } else {
        date
    }
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    if has_iso_date_prefix(s) {
        return parse_iso_extended(s);
    }
    // Basic format, e.g. 20250601
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok();
    }
    None
}

/// ISO-8601 extended dates always start with `YYYY-MM-DD`.
fn has_iso_date_prefix(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit)
}

fn parse_iso_extended(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ISO_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // Offset-qualified forms keep the wall-clock date
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_local().date())
}
