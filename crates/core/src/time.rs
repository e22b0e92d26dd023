//! Timestamp parsing for user input and rendering for replies.

use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Naive layouts accepted for `update`, all interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Years a reported death may fall in.
const SUPPORTED_YEARS: RangeInclusive<i32> = 1970..=9999;

/// Parse a user-supplied death time.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]` (space or `T` separator) as UTC, or an
/// RFC 3339 timestamp with an explicit offset. Years outside 1970..=9999 are
/// rejected.
pub fn parse_utc_timestamp(input: &str) -> Result<Timestamp, CoreError> {
    let parsed = parse_any(input)?;
    if !SUPPORTED_YEARS.contains(&parsed.year()) {
        return Err(CoreError::InvalidTimestamp(format!(
            "'{}' is out of range. Use a year between {} and {}",
            input.trim(),
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )));
    }
    Ok(parsed)
}

fn parse_any(input: &str) -> Result<Timestamp, CoreError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CoreError::InvalidTimestamp(
            "A date and time are required, e.g. 2025-04-12 15:45".into(),
        ));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            CoreError::InvalidTimestamp(format!(
                "'{input}' is not a valid date/time. Use something like 2025-04-12 15:45 (UTC)"
            ))
        })
}

/// How absolute times are written into replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// Platform-localized token `<t:UNIX:F>`; each reader sees their own timezone.
    #[default]
    Discord,
    /// Plain `YYYY-MM-DD HH:MM UTC`.
    Utc,
}

impl TimeFormat {
    pub fn render(&self, ts: Timestamp) -> String {
        match self {
            TimeFormat::Discord => format!("<t:{}:F>", ts.timestamp()),
            TimeFormat::Utc => ts.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

impl FromStr for TimeFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discord" => Ok(TimeFormat::Discord),
            "utc" => Ok(TimeFormat::Utc),
            other => Err(CoreError::Validation(format!(
                "Unknown time format '{other}'. Use 'discord' or 'utc'"
            ))),
        }
    }
}
