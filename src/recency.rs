use crate::models::{RecencyEntry, RowRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

/// How many rows the date picker offers.
pub const RECENT_LIMIT: usize = 10;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %I:%M %p",
];

// Order matters: `%Y` reads any digit count, so "1/7/24" must meet the US shapes (two-digit
// year first) before `%Y/%m/%d` can take it as year 1.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%A, %B %d, %Y",
    "%A %B %d, %Y",
    "%d %B %Y",
    "%B %d %Y",
    "%d-%b-%Y",
];

/// The last [`RECENT_LIMIT`] rows by physical position, reordered newest first by the
/// second column. Rows outside that tail are never considered, whatever their date.
pub fn select_recent(rows: &[RowRecord]) -> Vec<RecencyEntry> {
    let start = rows.len().saturating_sub(RECENT_LIMIT);
    let mut entries: Vec<RecencyEntry> = rows[start..]
        .iter()
        .map(|row| RecencyEntry {
            row_index: row.row_index,
            sort_key: sort_key(row.values.get(1).map(String::as_str).unwrap_or("")),
            values: row.values.clone(),
        })
        .collect();

    // Stable: equal keys stay in physical order, and -0 ties with 0.
    entries.sort_by(|a, b| {
        b.sort_key
            .partial_cmp(&a.sort_key)
            .unwrap_or(Ordering::Equal)
    });
    entries
}

/// Blank -> 0, numeric -> the number, date -> epoch seconds, anything else -> 0.
pub fn sort_key(raw: &str) -> f64 {
    let value = raw.trim();
    if value.is_empty() {
        return 0.0;
    }
    if let Some(number) = parse_number(value) {
        return number;
    }
    parse_timestamp(&strip_ordinals(value))
        .map(|secs| secs as f64)
        .unwrap_or(0.0)
}

/// "January 7th, 2024" -> "January 7, 2024".
fn strip_ordinals(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut i = 0;
    while i < chars.len() {
        out.push(chars[i]);
        if chars[i].is_ascii_digit() && is_ordinal_suffix(&chars[i + 1..]) {
            i += 3;
        } else {
            i += 1;
        }
    }
    out
}

fn is_ordinal_suffix(rest: &[char]) -> bool {
    let [first, second, tail @ ..] = rest else {
        return false;
    };
    let suffix = [first.to_ascii_lowercase(), second.to_ascii_lowercase()];
    matches!(suffix, ['s', 't'] | ['n', 'd'] | ['r', 'd'] | ['t', 'h'])
        && tail.first().is_none_or(|c| !c.is_alphabetic())
}

fn parse_number(value: &str) -> Option<f64> {
    if !value.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Seconds since the epoch. Values without a zone are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.timestamp());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(value) {
        return Some(parsed.timestamp());
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc().timestamp());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return parsed
                .and_hms_opt(0, 0, 0)
                .map(|midnight| midnight.and_utc().timestamp());
        }
    }
    None
}
