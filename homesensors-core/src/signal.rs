//! Closed vocabularies for the sensor data API
//!
//! Every request field with a fixed set of legal values is a real enum so
//! out-of-vocabulary inputs are rejected at deserialization time instead
//! of leaking into queries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{SensorError, SensorResult};

/// A measured physical quantity reported by the BME280 sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Temperature,
    Humidity,
    Pressure,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Temperature => "temperature",
            Signal::Humidity => "humidity",
            Signal::Pressure => "pressure",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Signal {
    type Err = SensorError;

    fn from_str(s: &str) -> SensorResult<Self> {
        match s {
            "temperature" => Ok(Signal::Temperature),
            "humidity" => Ok(Signal::Humidity),
            "pressure" => Ok(Signal::Pressure),
            other => Err(SensorError::parse(format!("unknown signal '{other}'"))),
        }
    }
}

/// Where a sensor is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Office,
    Kitchen,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Office => "office",
            Location::Kitchen => "kitchen",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Width of the aggregation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "15m")]
    QuarterHour,
}

impl Resolution {
    /// Base window used when a request leaves the resolution unset
    pub const DEFAULT: Resolution = Resolution::Hour;

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Day => "1d",
            Resolution::Hour => "1h",
            Resolution::QuarterHour => "15m",
        }
    }

    /// The `every:` duration literal for `aggregateWindow`
    pub fn flux_every(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reduction function applied within each aggregation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Avg,
    Max,
    Min,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Avg => "avg",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
        }
    }

    /// Translate to the engine's native aggregation function.
    ///
    /// This is the single source-of-truth mapping table. `min` is part of
    /// the API vocabulary but has no engine mapping; asking for it is an
    /// explicit error, never a silent substitution with `mean`.
    pub fn flux_function(&self) -> SensorResult<&'static str> {
        match self {
            Aggregation::Avg => Ok("mean"),
            Aggregation::Max => Ok("max"),
            Aggregation::Min => Err(SensorError::UnsupportedAggregation(
                self.as_str().to_string(),
            )),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_serde_roundtrip() {
        let json = serde_json::to_string(&Signal::Temperature).unwrap();
        assert_eq!(json, "\"temperature\"");

        let parsed: Signal = serde_json::from_str("\"pressure\"").unwrap();
        assert_eq!(parsed, Signal::Pressure);

        assert!(serde_json::from_str::<Signal>("\"co2\"").is_err());
    }

    #[test]
    fn test_signal_from_str() {
        assert_eq!("humidity".parse::<Signal>().unwrap(), Signal::Humidity);
        assert!("noise".parse::<Signal>().is_err());
    }

    #[test]
    fn test_resolution_rename() {
        let parsed: Resolution = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(parsed, Resolution::QuarterHour);
        assert_eq!(serde_json::to_string(&Resolution::Day).unwrap(), "\"1d\"");
    }

    #[test]
    fn test_aggregation_engine_mapping() {
        assert_eq!(Aggregation::Avg.flux_function().unwrap(), "mean");
        assert_eq!(Aggregation::Max.flux_function().unwrap(), "max");
    }

    #[test]
    fn test_min_has_no_engine_mapping() {
        let err = Aggregation::Min.flux_function().unwrap_err();
        assert_eq!(err.category(), "unsupported_aggregation");
    }
}
