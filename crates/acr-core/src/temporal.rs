//! # UTC-only timestamps
//!
//! [`Timestamp`] wraps `chrono::DateTime<Utc>` truncated to whole seconds.
//! Every timestamp that can end up inside a canonical payload must render
//! identically everywhere, so sub-second precision and non-UTC offsets are
//! normalized away at construction.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC timestamp with second precision.
///
/// Renders as `YYYY-MM-DDTHH:MM:SSZ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate(Utc::now()))
    }

    /// From a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate(dt))
    }

    /// Parse an RFC 3339 string, converting any offset to UTC.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::InvalidValue(format!("invalid RFC 3339 timestamp {s:?}: {e}")))?;
        Ok(Self(truncate(dt.with_timezone(&Utc))))
    }

    /// The inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// ISO 8601 with `Z` suffix, e.g. `2024-07-15T12:00:00Z`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_utc_truncates_nanos() {
        let dt = Utc
            .with_ymd_and_hms(2024, 7, 15, 9, 30, 45)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        let ts = Timestamp::from_utc(dt);
        assert_eq!(ts.to_iso8601(), "2024-07-15T09:30:45Z");
    }

    #[test]
    fn parse_converts_offsets_to_utc() {
        let ts = Timestamp::parse("2024-07-15T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2024-07-15T12:00:00Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("2024-07-15").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn display_matches_iso8601() {
        let ts = Timestamp::parse("2024-07-15T12:00:00Z").unwrap();
        assert_eq!(format!("{ts}"), "2024-07-15T12:00:00Z");
    }

    #[test]
    fn ordering() {
        let a = Timestamp::parse("2024-07-15T12:00:00Z").unwrap();
        let b = Timestamp::parse("2024-07-15T12:00:01Z").unwrap();
        assert!(a < b);
    }

    #[test]
    fn serde_roundtrip() {
        let ts = Timestamp::parse("2024-07-15T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, back);
    }
}
