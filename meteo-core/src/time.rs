//! Timestamp rendering and validation of free-form date/hour input.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;
use tracing::{debug, warn};

/// Accepted user date formats, tried in order; the first match wins.
pub const USER_DATE_FORMATS: [&str; 4] = ["%Y/%m/%d", "%d-%m-%Y", "%Y-%m-%d", "%d/%m/%Y"];

const TARGET_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error(
        "Invalid date format '{0}'. Please use 'YYYY/MM/DD', 'DD-MM-YYYY', 'YYYY-MM-DD', or 'DD/MM/YYYY'."
    )]
    InvalidDate(String),

    #[error("Invalid hour '{0}'. Please enter a valid integer for the hour.")]
    HourNotInteger(String),

    #[error("Invalid hour {0}. Please enter a valid hour in the range [0, 23].")]
    HourOutOfRange(i64),
}

/// Render a Unix timestamp as (`DD-MM-YYYY`, `HH:MM`) in `zone`.
///
/// Returns `None` (and logs a warning) when the timestamp cannot be
/// represented, e.g. NaN or far outside the supported calendar range.
pub fn format_timestamp<Z>(timestamp: f64, zone: &Z) -> Option<(String, String)>
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    let Some(utc) = datetime_from_unix(timestamp) else {
        warn!(timestamp, "Error converting timestamp to date and time");
        return None;
    };

    let local = utc.with_timezone(zone);
    Some((
        local.format("%d-%m-%Y").to_string(),
        local.format("%H:%M").to_string(),
    ))
}

fn datetime_from_unix(timestamp: f64) -> Option<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return None;
    }

    let secs = timestamp.floor();
    if secs <= i64::MIN as f64 || secs >= i64::MAX as f64 {
        return None;
    }

    let nanos = ((timestamp - secs) * 1e9).round().clamp(0.0, 999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}

pub fn parse_user_date(input: &str) -> Result<NaiveDate, InputError> {
    let input = input.trim();
    USER_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .ok_or_else(|| InputError::InvalidDate(input.to_string()))
}

pub fn parse_user_hour(input: &str) -> Result<u32, InputError> {
    let trimmed = input.trim();
    let hour: i64 = trimmed
        .parse()
        .map_err(|_| InputError::HourNotInteger(trimmed.to_string()))?;

    match u32::try_from(hour) {
        Ok(hour) if hour <= 23 => Ok(hour),
        _ => Err(InputError::HourOutOfRange(hour)),
    }
}

/// Combine a user date and hour into a datetime on the hour.
pub fn parse_user_datetime(date_input: &str, hour_input: &str) -> Result<NaiveDateTime, InputError> {
    let outcome = parse_user_date(date_input).and_then(|date| {
        let hour = parse_user_hour(hour_input)?;
        let time = NaiveTime::from_hms_opt(hour, 0, 0).ok_or(InputError::HourOutOfRange(hour.into()))?;
        Ok(date.and_time(time))
    });

    if let Err(err) = &outcome {
        debug!(date = date_input, hour = hour_input, error = %err, "Rejected user input");
    }
    outcome
}

/// Canonical `YYYY-MM-DD HH:00:00` form of a user date and hour.
pub fn parse_user_input(date_input: &str, hour_input: &str) -> Result<String, InputError> {
    parse_user_datetime(date_input, hour_input)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Lenient parse of a target instant as sent in tool calls.
///
/// Accepts the canonical `YYYY-MM-DD HH:MM:SS` form, ISO `T`-separated forms,
/// and bare dates in any user date format (taken as midnight).
pub fn parse_target_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    parse_datetime_formats(input)
        .or_else(|| parse_date_formats(input).map(|date| date.and_time(NaiveTime::MIN)))
}

/// Lenient parse of a target day; datetimes are truncated to their date.
pub fn parse_target_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    parse_date_formats(input).or_else(|| parse_datetime_formats(input).map(|at| at.date()))
}

fn parse_datetime_formats(input: &str) -> Option<NaiveDateTime> {
    TARGET_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}

fn parse_date_formats(input: &str) -> Option<NaiveDate> {
    USER_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
}
