//! Normalized snapshot timestamps
//!
//! Every timestamp stored by terrascore is a naive ISO-8601 date-time
//! (`2023-06-15T00:00:00`). Inputs are accepted in several shapes:
//!
//! - ISO-8601 date-times, with or without fractional seconds or a UTC offset
//! - collection stamps in the `YYYYMMDD_HHMMSS` form used for raw output directories
//! - plain `YYYY-MM-DD` dates (midnight)

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Format of collection stamps (`20230615_142501`)
pub const COLLECTION_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Timestamp could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid timestamp format: {0}")]
pub struct TimestampError(pub String);

/// A normalized point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Wrap a naive date-time
    pub fn new(dt: NaiveDateTime) -> Self {
        Self(dt)
    }

    /// Midnight of the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN))
    }

    /// Current local time
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// Parse any accepted input shape
    pub fn parse(input: &str) -> Result<Self, TimestampError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(TimestampError(input.to_string()));
        }

        for format in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self(dt));
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.naive_utc()));
        }

        if let Ok(dt) = NaiveDateTime::parse_from_str(s, COLLECTION_STAMP_FORMAT) {
            return Ok(Self(dt));
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }

        Err(TimestampError(input.to_string()))
    }

    /// The wrapped date-time
    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Calendar date part
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Absolute distance to another timestamp
    pub fn abs_diff(&self, other: &Timestamp) -> Duration {
        (self.0 - other.0).abs()
    }

    /// Render as a collection stamp (`YYYYMMDD_HHMMSS`)
    pub fn collection_stamp(&self) -> String {
        self.0.format(COLLECTION_STAMP_FORMAT).to_string()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.nanosecond() == 0 {
            write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
        } else {
            write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.6f"))
        }
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Timestamp::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_date_is_midnight() {
        let ts = Timestamp::parse("2023-06-15").unwrap();
        assert_eq!(ts.to_string(), "2023-06-15T00:00:00");
    }

    #[test]
    fn test_collection_stamp() {
        let ts = Timestamp::parse("20230615_142501").unwrap();
        assert_eq!(ts.to_string(), "2023-06-15T14:25:01");
        assert_eq!(ts.collection_stamp(), "20230615_142501");
    }

    #[test]
    fn test_iso_variants() {
        assert_eq!(
            Timestamp::parse("2023-06-15T08:30:00").unwrap().to_string(),
            "2023-06-15T08:30:00"
        );
        assert_eq!(
            Timestamp::parse("2023-06-15 08:30").unwrap().to_string(),
            "2023-06-15T08:30:00"
        );
        assert_eq!(
            Timestamp::parse("2023-06-15T08:30:00.250000").unwrap().to_string(),
            "2023-06-15T08:30:00.250000"
        );
    }

    #[test]
    fn test_offset_is_converted_to_utc() {
        let ts = Timestamp::parse("2023-06-15T02:00:00+02:00").unwrap();
        assert_eq!(ts.to_string(), "2023-06-15T00:00:00");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Timestamp::parse("not a date").is_err());
        assert!(Timestamp::parse("2023/06/15").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn test_ordering_and_diff() {
        let a = Timestamp::parse("2023-01-01").unwrap();
        let b = Timestamp::parse("2023-01-31").unwrap();
        assert!(a < b);
        assert_eq!(a.abs_diff(&b), Duration::days(30));
        assert_eq!(b.abs_diff(&a), Duration::days(30));
    }

    #[test]
    fn test_serde_as_string() {
        let ts = Timestamp::parse("2023-06-15").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2023-06-15T00:00:00\"");
        let back: Timestamp = serde_json::from_str("\"20230615_000000\"").unwrap();
        assert_eq!(back, ts);
    }
}
