//! Request datetime parsing and range handling
//!
//! Normalization policy: timestamps carrying an explicit offset are
//! converted to UTC; naive ISO 8601 timestamps are interpreted as UTC.
//! Anything else is a validation-grade error.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::error::{SensorError, SensorResult};

/// Parse a request datetime into a UTC instant
pub fn parse_datetime(s: &str) -> SensorResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| SensorError::TimeRange(format!("invalid datetime '{s}': {e}")))
}

/// Time range for queries, start and end inclusive-exclusive per the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new time range; start must not be after end
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> SensorResult<Self> {
        if start > end {
            return Err(SensorError::TimeRange(
                "start_datetime must not be after end_datetime".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse and order-check a pair of request datetimes
    pub fn parse(start: &str, end: &str) -> SensorResult<Self> {
        Self::new(parse_datetime(start)?, parse_datetime(end)?)
    }

    /// Range start as RFC 3339 UTC, second precision, `Z` suffix
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Range end as RFC 3339 UTC, second precision, `Z` suffix
    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_naive_datetime_assumes_utc() {
        let dt = parse_datetime("2025-01-01T00:30:00").unwrap();
        assert_eq!(dt.to_rfc3339_opts(SecondsFormat::Secs, true), "2025-01-01T00:30:00Z");
    }

    #[test]
    fn test_parse_offset_datetime_converts_to_utc() {
        let dt = parse_datetime("2025-01-01T02:30:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339_opts(SecondsFormat::Secs, true), "2025-01-01T00:30:00Z");
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let dt = parse_datetime("2025-01-01T00:30:00.250").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        let err = parse_datetime("yesterday").unwrap_err();
        assert_eq!(err.category(), "time_range");
    }

    #[test]
    fn test_range_ordering() {
        assert!(TimeRange::parse("2025-01-01T00:00:00", "2025-01-01T02:00:00").is_ok());
        // start == end is allowed
        assert!(TimeRange::parse("2025-01-01T00:00:00", "2025-01-01T00:00:00").is_ok());

        let err = TimeRange::parse("2025-01-01T02:00:00", "2025-01-01T00:00:00").unwrap_err();
        assert_eq!(err.category(), "time_range");
    }
}
