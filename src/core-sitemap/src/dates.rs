//! ISO-8601 helpers for `lastmod` values.
//!
//! Every function here produces timestamps shaped like `2024-01-31T12:00:00+01:00`,
//! in the local offset of the machine running the generator.

use std::sync::LazyLock;

use chrono::{
    DateTime, FixedOffset, Local, Months, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta,
    TimeZone, Utc,
};
use regex::Regex;

use crate::errors::ValidationError;

static ISO8601_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(?:Z|[+-][0-9]{2}:?[0-9]{2})$")
        .expect("static ISO-8601 pattern is valid")
});

const DATE_TIME_PART: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];

/// Formats any zoned timestamp as ISO-8601 with second precision and a `±HH:MM` offset.
pub fn format_iso8601<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// True if the value is a strict ISO-8601 date-time with an offset.
///
/// The date-time part must survive a parse/format round-trip unchanged, which rules out
/// impossible calendar dates like `2024-02-30T00:00:00Z`.
///
/// ```
/// # use core_sitemap::dates::is_valid_iso8601;
/// assert!(is_valid_iso8601("2024-01-31T12:00:00+01:00"));
/// assert!(is_valid_iso8601("2024-01-31T12:00:00+0100"));
/// assert!(is_valid_iso8601("2024-01-31T12:00:00Z"));
/// assert!(!is_valid_iso8601("2024-01-31"));
/// ```
pub fn is_valid_iso8601(date: &str) -> bool {
    if !ISO8601_SHAPE.is_match(date) {
        return false;
    }

    match parse_iso8601(date) {
        Some(parsed) => date.get(..19) == Some(parsed.format(DATE_TIME_PART).to_string().as_str()),
        None => false,
    }
}

fn parse_iso8601(date: &str) -> Option<DateTime<FixedOffset>> {
    let offset = &date[19..];
    if offset == "Z" || offset.contains(':') {
        DateTime::parse_from_rfc3339(date).ok()
    } else {
        DateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%z").ok()
    }
}

/// Converts a date written in a common format into ISO-8601.
///
/// Understands RFC 3339, RFC 2822, `YYYY-MM-DD[ HH:MM[:SS]]`, `YYYY/MM/DD`,
/// `January 31, 2024`, `31 January 2024` and the keywords `now`, `today` and `yesterday`.
/// Values without an offset are read as local time. Unix timestamps are not accepted here,
/// use [`convert_timestamp_to_iso8601`].
pub fn convert_date_to_iso8601(date: &str) -> Result<String, ValidationError> {
    let trimmed = date.trim();

    match trimmed.to_ascii_lowercase().as_str() {
        "now" => return Ok(time_now()),
        "today" => return local_midnight(Local::now().date_naive()).ok_or_else(|| unparseable(date)),
        "yesterday" => {
            let yesterday = Local::now().date_naive() - TimeDelta::days(1);
            return local_midnight(yesterday).ok_or_else(|| unparseable(date));
        }
        _ => {}
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(format_iso8601(&parsed));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(format_iso8601(&parsed));
    }
    if let Ok(parsed) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(format_iso8601(&parsed));
    }

    let naive = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
                .and_then(|day| day.and_hms_opt(0, 0, 0))
        });

    naive
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| format_iso8601(&local))
        .ok_or_else(|| unparseable(date))
}

fn local_midnight(day: NaiveDate) -> Option<String> {
    day.and_hms_opt(0, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| format_iso8601(&local))
}

fn unparseable(date: &str) -> ValidationError {
    ValidationError::UnparseableDate(date.to_string())
}

/// Converts a Unix timestamp (seconds) into ISO-8601 local time.
pub fn convert_timestamp_to_iso8601(timestamp: i64) -> Result<String, ValidationError> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|utc| format_iso8601(&utc.with_timezone(&Local)))
        .ok_or(ValidationError::InvalidTimestamp(timestamp))
}

/// ISO-8601 for the current instant.
pub fn time_now() -> String {
    format_iso8601(&Local::now())
}

/// ISO-8601 for 24 hours ago.
pub fn time_yesterday() -> String {
    format_iso8601(&(Local::now() - TimeDelta::hours(24)))
}

/// ISO-8601 for seven days ago.
pub fn time_one_week() -> String {
    format_iso8601(&(Local::now() - TimeDelta::weeks(1)))
}

/// ISO-8601 for one calendar month ago.
pub fn time_one_month() -> String {
    let now = Local::now();
    let month_ago = now
        .checked_sub_months(Months::new(1))
        .unwrap_or_else(|| now - TimeDelta::days(30));
    format_iso8601(&month_ago)
}
