//! Timestamp codec and period arithmetic
//!
//! All timestamps cross the public API either as epoch milliseconds or as
//! localized `yyyy-MM-dd HH:mm:ss.SSS` strings. The codec anchors the string
//! form to the configured UTC offset; the offset must agree with the zone id
//! the backend is given for bucketing (`SearchConfig::time_zone`).

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The only supported string timestamp shape.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Bucket width unit for date-histogram aggregations.
///
/// Wire codes follow the backend's interval syntax: `s`, `m`, `h`, `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodUnit {
    #[serde(rename = "s")]
    Second,
    #[serde(rename = "m")]
    Minute,
    #[serde(rename = "h")]
    Hour,
    #[serde(rename = "d")]
    Day,
}

impl PeriodUnit {
    /// Parse a wire code. Anything but `s`/`m`/`h`/`d` is an error.
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "s" => Ok(Self::Second),
            "m" => Ok(Self::Minute),
            "h" => Ok(Self::Hour),
            "d" => Ok(Self::Day),
            other => Err(Error::InvalidPeriodUnit(other.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Second => "s",
            Self::Minute => "m",
            Self::Hour => "h",
            Self::Day => "d",
        }
    }

    pub fn unit_millis(&self) -> i64 {
        match self {
            Self::Second => 1_000,
            Self::Minute => 60_000,
            Self::Hour => 3_600_000,
            Self::Day => 86_400_000,
        }
    }
}

/// Width of one bucket in milliseconds.
pub fn period_length_millis(period: u32, unit: PeriodUnit) -> i64 {
    i64::from(period) * unit.unit_millis()
}

/// Interval string for the backend's date histogram, e.g. `60m`, `24h`.
pub fn interval(period: u32, unit: PeriodUnit) -> String {
    format!("{}{}", period, unit.code())
}

/// Converts between localized timestamp strings and epoch milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct TimeCodec {
    offset: FixedOffset,
}

impl TimeCodec {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Parse a `yyyy-MM-dd HH:mm:ss.SSS` string into epoch milliseconds.
    pub fn parse_millis(&self, value: &str) -> Result<i64> {
        let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .map_err(|e| Error::Parse(format!("Bad timestamp '{}': {}", value, e)))?;
        let local = self
            .offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| Error::Parse(format!("Ambiguous timestamp '{}'", value)))?;
        Ok(local.timestamp_millis())
    }

    /// Render epoch milliseconds as a localized timestamp string.
    pub fn format_millis(&self, millis: i64) -> String {
        match self.local(millis) {
            Some(dt) => dt.format(TIMESTAMP_FORMAT).to_string(),
            None => millis.to_string(),
        }
    }

    /// Truncate a timestamp to the period-aligned boundary used when
    /// gap-filling a series.
    ///
    /// Only the "full unit" period values collapse the next-larger field:
    /// `24h` behaves like a day boundary, `60m` like an hour boundary, `60s`
    /// like a minute boundary. Every other period merely zeroes the sub-unit
    /// fields. Milliseconds are always dropped.
    pub fn truncate_to_period(&self, millis: i64, period: u32, unit: PeriodUnit) -> i64 {
        let Some(dt) = self.local(millis) else {
            return millis;
        };

        let truncated = match unit {
            PeriodUnit::Day => dt
                .with_hour(0)
                .and_then(|d| d.with_minute(0))
                .and_then(|d| d.with_second(0)),
            PeriodUnit::Hour => {
                let dt = if period == 24 { dt.with_hour(0) } else { Some(dt) };
                dt.and_then(|d| d.with_minute(0)).and_then(|d| d.with_second(0))
            }
            PeriodUnit::Minute => {
                let dt = if period == 60 {
                    dt.with_minute(0)
                } else {
                    Some(dt)
                };
                dt.and_then(|d| d.with_second(0))
            }
            PeriodUnit::Second => {
                if period == 60 {
                    dt.with_second(0)
                } else {
                    Some(dt)
                }
            }
        };

        truncated
            .and_then(|d| d.with_nanosecond(0))
            .map(|d| d.timestamp_millis())
            .unwrap_or(millis)
    }

    fn local(&self, millis: i64) -> Option<DateTime<FixedOffset>> {
        self.offset.timestamp_millis_opt(millis).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seoul() -> TimeCodec {
        TimeCodec::new(FixedOffset::east_opt(9 * 3600).unwrap())
    }

    #[test]
    fn test_parse_known_instant() {
        // 2017-11-07 03:00 KST == 2017-11-06 18:00 UTC
        let millis = seoul().parse_millis("2017-11-07 03:00:00.000").unwrap();
        assert_eq!(millis, 1_509_991_200_000);
    }

    #[test]
    fn test_parse_format_roundtrip() {
        let codec = seoul();
        for value in [
            "2017-11-07 03:00:00.000",
            "2017-11-07 08:15:42.123",
            "2024-02-29 23:59:59.999",
        ] {
            let millis = codec.parse_millis(value).unwrap();
            assert_eq!(codec.format_millis(millis), value);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let codec = seoul();
        assert!(codec.parse_millis("2017-11-07").is_err());
        assert!(codec.parse_millis("2017/11/07 03:00:00.000").is_err());
        assert!(codec.parse_millis("not a time").is_err());
    }

    #[test]
    fn test_period_unit_codes() {
        assert_eq!(PeriodUnit::from_code("s").unwrap(), PeriodUnit::Second);
        assert_eq!(PeriodUnit::from_code("m").unwrap(), PeriodUnit::Minute);
        assert_eq!(PeriodUnit::from_code("h").unwrap(), PeriodUnit::Hour);
        assert_eq!(PeriodUnit::from_code("d").unwrap(), PeriodUnit::Day);
        assert!(matches!(
            PeriodUnit::from_code("w"),
            Err(Error::InvalidPeriodUnit(_))
        ));
    }

    #[test]
    fn test_period_length() {
        assert_eq!(period_length_millis(1, PeriodUnit::Second), 1_000);
        assert_eq!(period_length_millis(60, PeriodUnit::Minute), 3_600_000);
        assert_eq!(period_length_millis(24, PeriodUnit::Hour), 86_400_000);
        assert_eq!(period_length_millis(7, PeriodUnit::Day), 604_800_000);
    }

    #[test]
    fn test_interval_strings() {
        assert_eq!(interval(60, PeriodUnit::Minute), "60m");
        assert_eq!(interval(1, PeriodUnit::Hour), "1h");
    }

    #[test]
    fn test_truncate_hour() {
        let codec = seoul();
        let millis = codec.parse_millis("2017-11-07 03:27:45.123").unwrap();

        let hour = codec.truncate_to_period(millis, 1, PeriodUnit::Hour);
        assert_eq!(codec.format_millis(hour), "2017-11-07 03:00:00.000");

        // A full day expressed in hours collapses to the day boundary.
        let day = codec.truncate_to_period(millis, 24, PeriodUnit::Hour);
        assert_eq!(codec.format_millis(day), "2017-11-07 00:00:00.000");
    }

    #[test]
    fn test_truncate_minute() {
        let codec = seoul();
        let millis = codec.parse_millis("2017-11-07 03:27:45.123").unwrap();

        // Partial-unit periods only drop the sub-unit fields.
        let partial = codec.truncate_to_period(millis, 5, PeriodUnit::Minute);
        assert_eq!(codec.format_millis(partial), "2017-11-07 03:27:00.000");

        let full = codec.truncate_to_period(millis, 60, PeriodUnit::Minute);
        assert_eq!(codec.format_millis(full), "2017-11-07 03:00:00.000");
    }

    #[test]
    fn test_truncate_second() {
        let codec = seoul();
        let millis = codec.parse_millis("2017-11-07 03:27:45.123").unwrap();

        let partial = codec.truncate_to_period(millis, 10, PeriodUnit::Second);
        assert_eq!(codec.format_millis(partial), "2017-11-07 03:27:45.000");

        let full = codec.truncate_to_period(millis, 60, PeriodUnit::Second);
        assert_eq!(codec.format_millis(full), "2017-11-07 03:27:00.000");
    }

    #[test]
    fn test_truncate_day() {
        let codec = seoul();
        let millis = codec.parse_millis("2017-11-07 23:59:59.999").unwrap();
        let day = codec.truncate_to_period(millis, 1, PeriodUnit::Day);
        assert_eq!(codec.format_millis(day), "2017-11-07 00:00:00.000");
    }
}
