use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, NaiveTime, Utc, Weekday};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TimestampError {
    #[error("Unparsable timestamp: {0}")]
    Invalid(String),

    #[error("Timestamp has no UTC offset: {0}")]
    Naive(String),

    #[error("Timestamp offset is not UTC: {0}")]
    NotUtc(String),
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO 8601 timestamp whose offset is exactly zero.
///
/// Seconds and fractional seconds are optional. The offset may be `Z`, `±HH`,
/// `±HHMM` or `±HH:MM`; any zero offset counts as UTC. A timestamp without an
/// offset is reported as [`TimestampError::Naive`] so callers can tell it
/// apart from garbage input.
pub fn parse_utc_timestamp(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    let (local, offset) = split_offset(value);
    let naive = parse_naive(local);

    match (naive, offset) {
        (Some(_), None) => Err(TimestampError::Naive(value.to_string())),
        (Some(naive), Some(offset)) => match parse_offset(offset) {
            Some(offset) if offset.local_minus_utc() == 0 => Ok(naive.and_utc()),
            Some(_) => Err(TimestampError::NotUtc(value.to_string())),
            None => Err(TimestampError::Invalid(value.to_string())),
        },
        (None, _) => Err(TimestampError::Invalid(value.to_string())),
    }
}

// The offset can only start after the `YYYY-MM-DD` date.
fn split_offset(value: &str) -> (&str, Option<&str>) {
    if let Some(local) = value.strip_suffix(['Z', 'z']) {
        return (local, Some("+00:00"));
    }
    match value.get(10..).and_then(|time| time.rfind(['+', '-'])) {
        Some(index) => {
            let (local, offset) = value.split_at(10 + index);
            (local, Some(offset))
        }
        None => (value, None),
    }
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

fn parse_offset(offset: &str) -> Option<FixedOffset> {
    if !offset.is_ascii() {
        return None;
    }
    let (sign, digits) = offset.split_at_checked(1)?;
    let sign = match sign {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let (hours, minutes) = match digits.len() {
        2 => (digits, "00"),
        4 => digits.split_at(2),
        5 => {
            let (hours, minutes) = digits.split_at(2);
            (hours, minutes.strip_prefix(':')?)
        }
        _ => return None,
    };
    if !(hours.bytes().all(|b| b.is_ascii_digit()) && minutes.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Whether `time` falls on `weekday` between `start` and `end`, both inclusive.
///
/// Sub-second precision counts: with an end of 19:00:00, 19:00:00.5 is outside.
pub fn in_rush_window(
    time: &DateTime<Utc>,
    weekday: Weekday,
    start: NaiveTime,
    end: NaiveTime,
) -> bool {
    if time.weekday() != weekday {
        return false;
    }
    let time_of_day = time.time();
    start <= time_of_day && time_of_day <= end
}
