//! Clock-time parsing for settings fields.
//!
//! Settings store times of day as strings. The 24-hour `HH:MM` form is
//! preferred; the 12-hour `H:MM AM/PM` form is accepted as a fallback.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ConfigError;

const TWENTY_FOUR_HOUR: &str = "%H:%M";
const TWELVE_HOUR_FORMATS: [&str; 2] = ["%I:%M %p", "%I:%M%p"];

/// Parse a clock-time string, naming `key` in the error on failure.
pub fn parse_clock_time(key: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    let trimmed = value.trim();

    if let Ok(time) = NaiveTime::parse_from_str(trimmed, TWENTY_FOUR_HOUR) {
        return Ok(time);
    }

    TWELVE_HOUR_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| ConfigError::InvalidTime {
            key: key.to_string(),
            value: value.to_string(),
        })
}

/// Bind a time of day to a calendar date.
pub fn at(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// Signed minutes from `from` to `to`.
pub fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_minutes()
}

/// Absolute minutes between two timestamps.
pub fn gap_minutes(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    minutes_between(a, b).abs()
}

/// Shift a timestamp by a signed number of minutes.
pub fn shift(time: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    time + Duration::minutes(minutes)
}
