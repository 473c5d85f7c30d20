//! Request and response models for the signals data endpoints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{SensorError, SensorResult};
use crate::signal::{Aggregation, Location, Resolution, Signal};
use crate::time::TimeRange;

/// Request body for the signals data endpoints.
///
/// The aggregation is not part of the body; each endpoint forces its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsRequest {
    /// Start of the aggregation period
    pub start_datetime: String,

    /// End of the aggregation period
    pub end_datetime: String,

    /// Time resolution of the aggregated data; defaults to 1h when absent
    #[serde(default)]
    pub resolution: Option<Resolution>,

    /// Location of the sensors
    pub location: Location,

    /// Signals to retrieve, at least one
    pub signals: Vec<Signal>,
}

impl SignalsRequest {
    /// Validate the request before any engine call is attempted
    pub fn validate_self(&self) -> SensorResult<()> {
        if self.signals.is_empty() {
            return Err(SensorError::validation("signals must not be empty"));
        }
        self.time_range()?;
        Ok(())
    }

    /// Parse and order-check the requested time range
    pub fn time_range(&self) -> SensorResult<TimeRange> {
        TimeRange::parse(&self.start_datetime, &self.end_datetime)
    }
}

/// One raw engine record: one signal value at one instant.
///
/// Ephemeral, produced per query, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Bucket timestamp as emitted by the engine (RFC 3339 string)
    pub ts: String,
    pub signal: Signal,
    pub value: f64,
}

impl RawRecord {
    pub fn new<S: Into<String>>(ts: S, signal: Signal, value: f64) -> Self {
        Self {
            ts: ts.into(),
            signal,
            value,
        }
    }
}

/// One pivoted output row: a bucket timestamp plus every signal seen at it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub ts: String,
    #[serde(flatten)]
    pub values: BTreeMap<Signal, f64>,
}

/// Response body for the signals data endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsResponse {
    pub start_datetime: String,
    pub end_datetime: String,
    pub resolution: Option<Resolution>,
    pub aggregation: Aggregation,

    /// Pivoted rows ascending by `ts`. Always a list, empty when nothing
    /// matched, never null.
    pub data: Vec<DataRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(signals: Vec<Signal>) -> SignalsRequest {
        SignalsRequest {
            start_datetime: "2025-01-01T00:00:00".to_string(),
            end_datetime: "2025-01-01T02:00:00".to_string(),
            resolution: Some(Resolution::Hour),
            location: Location::Office,
            signals,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request(vec![Signal::Temperature]).validate_self().is_ok());
    }

    #[test]
    fn test_empty_signals_rejected() {
        let err = request(vec![]).validate_self().unwrap_err();
        assert_eq!(err.category(), "validation");
    }

    #[test]
    fn test_reversed_range_rejected() {
        let mut req = request(vec![Signal::Pressure]);
        req.start_datetime = "2025-01-02T00:00:00".to_string();
        req.end_datetime = "2025-01-01T00:00:00".to_string();
        assert!(req.validate_self().is_err());
    }

    #[test]
    fn test_request_deserialization() {
        let body = r#"{
            "start_datetime": "2025-01-01T00:00:00",
            "end_datetime": "2025-01-01T02:00:00",
            "resolution": "1h",
            "location": "office",
            "signals": ["temperature", "pressure"]
        }"#;
        let req: SignalsRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.resolution, Some(Resolution::Hour));
        assert_eq!(req.signals, vec![Signal::Temperature, Signal::Pressure]);
    }

    #[test]
    fn test_resolution_may_be_absent() {
        let body = r#"{
            "start_datetime": "2025-01-01T00:00:00",
            "end_datetime": "2025-01-01T02:00:00",
            "location": "kitchen",
            "signals": ["humidity"]
        }"#;
        let req: SignalsRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.resolution, None);
    }

    #[test]
    fn test_data_row_flattens_signals() {
        let mut values = BTreeMap::new();
        values.insert(Signal::Temperature, 20.0);
        values.insert(Signal::Pressure, 1000.0);
        let row = DataRow {
            ts: "2025-01-01T00:30:00Z".to_string(),
            values,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ts": "2025-01-01T00:30:00Z",
                "temperature": 20.0,
                "pressure": 1000.0
            })
        );
    }
}
