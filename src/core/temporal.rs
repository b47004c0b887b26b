//! Temporal codec
//!
//! Durations and timestamps are stored as chrono values and cross the wire as
//! display strings. The parse grammars accept everything the formatters emit,
//! so `parse_*(format_*(x))` always succeeds.
//!
//! | Value      | Format                | Parse                                        |
//! |------------|-----------------------|----------------------------------------------|
//! | duration   | `HH:MM:SS`            | `[-][d.]h:mm[:ss[.fffffff]]` or `[-]d`       |
//! | timestamp  | `dd/MM/yyyy HH:mm`    | `d/M/[±]yyyy[ H:mm[:ss]]` (`T` also separates) |
//!
//! Years outside `0..=9999` carry a sign (`+10000`, `-0001`) in both directions.

use crate::core::error::FormatError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;
use std::sync::OnceLock;

/// Display pattern for timestamps
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

const SECONDS_PER_DAY: i64 = 86_400;

/// Render a duration as zero-padded `HH:MM:SS`.
///
/// Hours are total hours and may exceed 23; sub-second precision is truncated.
/// Negative durations get a leading `-`.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Parse a duration.
///
/// Accepts `HH:MM:SS` plus the wider `[-][d.]h:mm[:ss[.fffffff]]` grammar and a
/// bare day count. Absent input is the caller's concern: an empty string is an
/// error here, never a zero duration.
pub fn parse_duration(input: &str) -> Result<TimeDelta, FormatError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(FormatError::Empty { kind: "duration" });
    }

    let invalid = || FormatError::InvalidDuration {
        value: input.to_string(),
    };

    if let Some(caps) = days_regex().captures(s) {
        let days: i64 = caps["days"].parse().map_err(|_| invalid())?;
        let seconds = days.checked_mul(SECONDS_PER_DAY).ok_or_else(invalid)?;
        let delta = TimeDelta::try_seconds(seconds).ok_or_else(invalid)?;
        return Ok(if caps.name("neg").is_some() { -delta } else { delta });
    }

    let caps = duration_regex().captures(s).ok_or_else(invalid)?;
    let number = |name: &str| -> Result<i64, FormatError> {
        caps.name(name)
            .map(|m| m.as_str().parse::<i64>().map_err(|_| invalid()))
            .unwrap_or(Ok(0))
    };

    let days = number("days")?;
    let hours = number("hours")?;
    let minutes = number("minutes")?;
    let seconds = number("seconds")?;

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }
    // With an explicit day part the hour field is an hour of day
    if caps.name("days").is_some() && hours >= 24 {
        return Err(invalid());
    }

    let total = days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|d| d.checked_add(hours.checked_mul(3600)?))
        .and_then(|t| t.checked_add(minutes * 60 + seconds))
        .ok_or_else(invalid)?;

    let nanos = match caps.name("fraction") {
        Some(m) => format!("{:0<9}", m.as_str())
            .parse::<i64>()
            .map_err(|_| invalid())?,
        None => 0,
    };

    let delta = TimeDelta::try_seconds(total)
        .and_then(|d| d.checked_add(&TimeDelta::nanoseconds(nanos)))
        .ok_or_else(invalid)?;

    Ok(if caps.name("neg").is_some() {
        -delta
    } else {
        delta
    })
}

/// Render a timestamp as `dd/MM/yyyy HH:mm`.
pub fn format_date(value: NaiveDateTime) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Parse a timestamp.
///
/// Day, month and hour need not be zero-padded; the time part is optional
/// (midnight) and may carry seconds. Every string produced by [`format_date`]
/// parses back to the same minute.
pub fn parse_date(input: &str) -> Result<NaiveDateTime, FormatError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(FormatError::Empty { kind: "date" });
    }

    let invalid = || FormatError::InvalidDate {
        value: input.to_string(),
    };

    let caps = date_regex().captures(s).ok_or_else(invalid)?;
    let field = |name: &str| -> Result<u32, FormatError> {
        caps.name(name)
            .map(|m| m.as_str().parse::<u32>().map_err(|_| invalid()))
            .unwrap_or(Ok(0))
    };

    let year: i32 = caps["year"].parse().map_err(|_| invalid())?;
    let date =
        NaiveDate::from_ymd_opt(year, field("month")?, field("day")?).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_opt(field("hour")?, field("minute")?, field("second")?)
        .ok_or_else(invalid)?;

    Ok(date.and_time(time))
}

fn duration_regex() -> &'static Regex {
    static DURATION_REGEX: OnceLock<Regex> = OnceLock::new();
    DURATION_REGEX.get_or_init(|| {
        Regex::new(
            r"^(?P<neg>-)?(?:(?P<days>\d+)\.)?(?P<hours>\d+):(?P<minutes>\d{1,2})(?::(?P<seconds>\d{1,2})(?:\.(?P<fraction>\d{1,7}))?)?$",
        )
        .unwrap()
    })
}

fn days_regex() -> &'static Regex {
    static DAYS_REGEX: OnceLock<Regex> = OnceLock::new();
    DAYS_REGEX.get_or_init(|| Regex::new(r"^(?P<neg>-)?(?P<days>\d+)$").unwrap())
}

fn date_regex() -> &'static Regex {
    static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
    DATE_REGEX.get_or_init(|| {
        Regex::new(
            r"^(?P<day>\d{1,2})/(?P<month>\d{1,2})/(?P<year>[+-]?\d{4,6})(?:[ T](?P<hour>\d{1,2}):(?P<minute>\d{1,2})(?::(?P<second>\d{1,2}))?)?$",
        )
        .unwrap()
    })
}

/// Serde adapter storing `Option<TimeDelta>` as an `HH:MM:SS` string
///
/// Used by fixture files so durations read the same there as on the wire.
pub mod duration_opt {
    use super::{format_duration, parse_duration};
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<TimeDelta>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_str(&format_duration(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TimeDelta>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
