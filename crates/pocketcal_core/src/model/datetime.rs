//! Canonical date/time text primitives.
//!
//! # Responsibility
//! - Parse `YYYY-MM-DD` and `HH:mm` text into calendar values.
//! - Reject non-canonical shapes instead of coercing them.
//!
//! # Invariants
//! - Canonical dates are zero padded, so string order equals calendar order.
//! - Parsing never panics; failures surface as `None`.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid date regex"));
static TIME_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{2}):([0-9]{2})$").expect("valid time regex"));

/// Display format used for canonical event dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Display format used for canonical event times.
pub const TIME_FORMAT: &str = "%H:%M";

/// Parses a canonical `YYYY-MM-DD` date.
///
/// Returns `None` for non-padded input (`2024-7-5`), surrounding whitespace or
/// impossible calendar dates (`2023-02-29`).
pub fn parse_event_date(value: &str) -> Option<NaiveDate> {
    let caps = DATE_SHAPE_RE.captures(value)?;
    let year = caps[1].parse::<i32>().ok()?;
    let month = caps[2].parse::<u32>().ok()?;
    let day = caps[3].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses a canonical 24-hour `HH:mm` time.
pub fn parse_event_time(value: &str) -> Option<NaiveTime> {
    let caps = TIME_SHAPE_RE.captures(value)?;
    let hour = caps[1].parse::<u32>().ok()?;
    let minute = caps[2].parse::<u32>().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parses a 4-digit year filter value.
pub fn parse_year(value: &str) -> Option<i32> {
    let trimmed = value.trim();
    if trimmed.len() != 4 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Parses a zero-padded `MM` month filter value (`01`..=`12`).
pub fn parse_month(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.len() != 2 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month = trimmed.parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some(month)
}

/// Formats a date in canonical event form.
pub fn format_event_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a time in canonical event form.
pub fn format_event_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
