//! Lenient date and time parsing
//!
//! Date parameters accept anything a person would reasonably type as a date:
//! ISO 8601 with or without a time, RFC 2822, slashed and dotted dates,
//! month names, ordinal days ("March 3rd, 2021"), year-month forms
//! ("2020-01", "Jan 2020"), 12-hour clock times ("3:04 PM"), a trailing
//! `UTC`/`GMT`/`Z` zone and bare times. The parse result is only used to
//! decide validity; callers keep the original text.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid ordinal pattern"));

static ZONE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:(\d)Z|\s*(?i:UTC|GMT))$").expect("valid zone pattern"));

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M%z",
    "%Y-%m-%dT%H:%M%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
    "%B %d, %Y %H:%M:%S%.f",
    "%B %d %Y %H:%M:%S%.f",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %I:%M %p",
    "%d %B %Y %H:%M:%S%.f",
    "%d %B %Y %H:%M",
    "%Y%m%dT%H%M%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%Y%m%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%A %B %d %Y",
];

/// Forms without a day; parsed as the first of the month
const YEAR_MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%m/%Y", "%B %Y", "%B, %Y"];

const TIME_FORMATS: &[&str] = &["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S%.f", "%H:%M"];

/// Tries to read `text` as a date, a date with a time, or a time of day.
///
/// Time-only input resolves against the Unix epoch date.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = ORDINAL_SUFFIX.replace_all(trimmed, "$1");
    let input = normalized.as_ref();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(input) {
        return Some(parsed.naive_utc());
    }
    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(input, format).ok())
    {
        return Some(parsed.naive_utc());
    }

    let zoneless = ZONE_SUFFIX.replace(input, "${1}");
    let input = zoneless.as_ref();

    if let Some(parsed) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
    {
        return Some(parsed);
    }
    // Before the day forms, which would read "Jan 2020" as Jan 20 of year 20.
    if let Some(parsed) = YEAR_MONTH_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(&format!("{} 1", input), &format!("{} %d", format)).ok()
    }) {
        return parsed.and_hms_opt(0, 0, 0);
    }
    if let Some(parsed) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
    {
        return parsed.and_hms_opt(0, 0, 0);
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(input, format).ok())
        .and_then(|time| NaiveDate::from_ymd_opt(1970, 1, 1).map(|date| date.and_time(time)))
}

/// Returns true if `text` parses as a date or time
pub fn is_date_literal(text: &str) -> bool {
    parse_datetime(text).is_some()
}
