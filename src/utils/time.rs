//! Time utilities: source timestamp parsing, local wall-clock parsing and
//! DST-aware local → UTC conversion.

use crate::errors::{AppError, AppResult};
use chrono::{
    DateTime, LocalResult, NaiveDateTime, NaiveTime, Offset, SecondsFormat, TimeDelta, TimeZone,
    Utc,
};
use chrono_tz::Tz;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];
const LOCAL_TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Parse an observation timestamp into UTC.
///
/// Accepted forms:
/// - RFC 3339 (`2023-01-22T12:09:39.388884Z`, `...+05:30`)
/// - `YYYY-MM-DD HH:MM:SS[.ffffff] UTC`
/// - `YYYY-MM-DD HH:MM:SS[.ffffff]+HH:MM`
/// - naive `YYYY-MM-DD HH:MM:SS[.ffffff]`, assumed UTC
///
/// # Examples
/// ```
/// use store_uptime::utils::time::parse_timestamp_utc;
///
/// let a = parse_timestamp_utc("2023-01-22 12:09:39.388884 UTC").unwrap();
/// let b = parse_timestamp_utc("2023-01-22T12:09:39.388884Z").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_timestamp_utc(value: &str) -> AppResult<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    let without_zone = trimmed
        .strip_suffix(" UTC")
        .or_else(|| trimmed.strip_suffix(" GMT"))
        .or_else(|| trimmed.strip_suffix('Z'))
        .unwrap_or(trimmed);

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(without_zone, format) {
            return Ok(naive.and_utc());
        }
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    Err(AppError::InvalidData(format!(
        "Unrecognised timestamp format: {:?}",
        value
    )))
}

/// Parse a local wall-clock time (`HH:MM:SS[.fff]` or `HH:MM`).
pub fn parse_local_time(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    LOCAL_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
}

/// Convert a local wall-clock datetime in `tz` to a UTC instant.
///
/// Ambiguous times (clocks going back) resolve to the earliest instant.
/// Times inside a gap (clocks going forward) keep the offset that was in
/// force before the transition, which lands them just after the gap.
pub fn local_to_utc(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let before = naive - TimeDelta::days(1);
            let offset = tz.offset_from_utc_datetime(&before).fix();
            let shift = TimeDelta::seconds(i64::from(offset.local_minus_utc()));
            (naive - shift).and_utc()
        }
    }
}

/// UTC instant as integer microseconds since the Unix epoch
pub fn to_micros(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_micros()
}

/// Inverse of [`to_micros`]
pub fn from_micros(micros: i64) -> Option<DateTime<Utc>> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos)
}

/// Exact microsecond count of a duration
pub fn delta_micros(delta: TimeDelta) -> i128 {
    i128::from(delta.num_seconds()) * 1_000_000 + i128::from(delta.subsec_nanos() / 1_000)
}

/// Render an instant for logs and console output
pub fn format_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
