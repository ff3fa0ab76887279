//! Timestamp helpers.
//!
//! Tables hold naive UTC timestamps. Conversion to the local zone only
//! happens for display.

use std::fmt;

use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone, Timelike, Utc, Weekday};
use serde::Serialize;

use crate::error::DataShapeError;

/// Coarse part of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeCategory {
    Morning,
    Daytime,
    Evening,
    Night,
}

impl fmt::Display for TimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Morning => "morning",
            Self::Daytime => "daytime",
            Self::Evening => "evening",
            Self::Night => "night",
        };
        f.write_str(name)
    }
}

/// Monday through Friday.
#[must_use]
pub fn is_weekday(timestamp: NaiveDateTime) -> bool {
    !matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Classify the hour of a timestamp.
///
/// Daytime is 09:00 to 17:59, morning 05:00 to 08:59, evening 18:00 to
/// 22:59 and night everything else.
#[must_use]
pub fn time_category(timestamp: NaiveDateTime) -> TimeCategory {
    match timestamp.hour() {
        9..=17 => TimeCategory::Daytime,
        5..=8 => TimeCategory::Morning,
        18..=22 => TimeCategory::Evening,
        _ => TimeCategory::Night,
    }
}

/// Parse a timestamp string into UTC.
///
/// Accepts RFC 3339 and the recorder's `YYYY-MM-DD HH:MM:SS[.ffffff]` form
/// (with either a space or `T` separator), the latter read as UTC.
///
/// # Errors
/// Returns [`DataShapeError::InvalidTimestamp`] if no format matches.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DataShapeError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DataShapeError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// Convert recorder epoch seconds into UTC with microsecond precision.
#[must_use]
pub fn from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * 1_000_000.0).round();
    if micros.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}

/// Shift a naive UTC timestamp into the machine's local zone.
#[must_use]
pub fn localize(timestamp: NaiveDateTime) -> NaiveDateTime {
    Local.from_utc_datetime(&timestamp).naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn weekdays_exclude_weekend() {
        // 2024-01-05 is a Friday.
        assert!(is_weekday(at(2024, 1, 5, 12)));
        assert!(!is_weekday(at(2024, 1, 6, 12)));
        assert!(!is_weekday(at(2024, 1, 7, 12)));
        assert!(is_weekday(at(2024, 1, 8, 12)));
    }

    #[test]
    fn hours_map_to_categories() {
        assert_eq!(time_category(at(2024, 1, 1, 4)), TimeCategory::Night);
        assert_eq!(time_category(at(2024, 1, 1, 5)), TimeCategory::Morning);
        assert_eq!(time_category(at(2024, 1, 1, 8)), TimeCategory::Morning);
        assert_eq!(time_category(at(2024, 1, 1, 9)), TimeCategory::Daytime);
        assert_eq!(time_category(at(2024, 1, 1, 17)), TimeCategory::Daytime);
        assert_eq!(time_category(at(2024, 1, 1, 18)), TimeCategory::Evening);
        assert_eq!(time_category(at(2024, 1, 1, 22)), TimeCategory::Evening);
        assert_eq!(time_category(at(2024, 1, 1, 23)), TimeCategory::Night);
    }

    #[test]
    fn parses_recorder_and_rfc3339_timestamps() {
        let expected = at(2024, 3, 1, 10).and_utc();
        assert_eq!(parse_timestamp("2024-03-01 10:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T10:00:00.000").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T10:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-01T11:00:00+01:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-01 10:00:00.250000").unwrap(),
            expected + chrono::TimeDelta::milliseconds(250)
        );
    }

    #[test]
    fn garbage_timestamps_are_rejected() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert_eq!(
            err,
            DataShapeError::InvalidTimestamp {
                value: "yesterday".into()
            }
        );
    }

    #[test]
    fn epoch_seconds_keep_microseconds() {
        let ts = from_epoch_seconds(1_700_000_000.5).unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert_eq!(ts.timestamp_subsec_micros(), 500_000);
        assert!(from_epoch_seconds(f64::NAN).is_none());
    }
}
