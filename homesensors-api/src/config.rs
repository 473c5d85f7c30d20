//! Configuration for the sensors data service
//!
//! Everything is carried in an explicit struct handed to the components at
//! construction; there is no process-wide mutable state. `load()` reads the
//! environment once at startup.

use serde::{Deserialize, Serialize};
use std::env;

use homesensors_core::error::{SensorError, SensorResult};

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to
    pub bind_address: String,

    /// Time-series engine connection settings
    pub influx: InfluxConfig,

    /// Query execution settings
    pub query: QueryLimitsConfig,
}

/// InfluxDB connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluxConfig {
    /// Engine host
    pub host: String,

    /// Engine port
    pub port: u16,

    /// API token; may be empty for unauthenticated dev instances
    pub token: String,

    /// Organization name
    pub org: String,

    /// Bucket holding the sensor samples
    pub bucket: String,
}

impl InfluxConfig {
    /// Base URL of the engine's HTTP API
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Query execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLimitsConfig {
    /// Per-attempt engine call timeout in milliseconds
    pub query_timeout_ms: u64,

    /// Backoff before the single retry, in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            influx: InfluxConfig::default(),
            query: QueryLimitsConfig::default(),
        }
    }
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
            token: String::new(),
            org: "home".to_string(),
            bucket: "temp_humidity_pressure".to_string(),
        }
    }
}

impl Default for QueryLimitsConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: 10_000,
            retry_backoff_ms: 250,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables and defaults
    pub fn load() -> SensorResult<Self> {
        let mut config = Self::default();

        if let Ok(bind_addr) = env::var("SENSORS_BIND_ADDRESS") {
            config.bind_address = bind_addr;
        }

        if let Ok(host) = env::var("INFLUXDB_HOST") {
            config.influx.host = host;
        }

        if let Ok(port) = env::var("INFLUXDB_PORT") {
            config.influx.port = port.parse().map_err(|_| {
                SensorError::configuration(format!("INFLUXDB_PORT is not a valid port: {port}"))
            })?;
        }

        if let Ok(token) = env::var("INFLUXDB_TOKEN") {
            config.influx.token = token;
        }

        if let Ok(org) = env::var("INFLUXDB_ORG") {
            config.influx.org = org;
        }

        if let Ok(bucket) = env::var("INFLUXDB_BUCKET") {
            config.influx.bucket = bucket;
        }

        if let Ok(timeout) = env::var("SENSORS_QUERY_TIMEOUT_MS") {
            config.query.query_timeout_ms = timeout.parse().map_err(|_| {
                SensorError::configuration(format!(
                    "SENSORS_QUERY_TIMEOUT_MS is not a number: {timeout}"
                ))
            })?;
        }

        if let Ok(backoff) = env::var("SENSORS_RETRY_BACKOFF_MS") {
            config.query.retry_backoff_ms = backoff.parse().map_err(|_| {
                SensorError::configuration(format!(
                    "SENSORS_RETRY_BACKOFF_MS is not a number: {backoff}"
                ))
            })?;
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> SensorResult<()> {
        if self.bind_address.is_empty() {
            return Err(SensorError::configuration("bind address cannot be empty"));
        }

        if self.influx.host.is_empty() {
            return Err(SensorError::configuration("engine host cannot be empty"));
        }

        if self.influx.org.is_empty() {
            return Err(SensorError::configuration("engine org cannot be empty"));
        }

        if self.influx.bucket.is_empty() {
            return Err(SensorError::configuration("engine bucket cannot be empty"));
        }

        if self.query.query_timeout_ms == 0 {
            return Err(SensorError::configuration(
                "query timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(ApiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_bucket_rejected() {
        let mut config = ApiConfig::default();
        config.influx.bucket.clear();
        let err = config.validate().unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ApiConfig::default();
        config.query.query_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_url() {
        let config = InfluxConfig {
            host: "influx.lan".to_string(),
            port: 8086,
            ..InfluxConfig::default()
        };
        assert_eq!(config.url(), "http://influx.lan:8086");
    }
}
