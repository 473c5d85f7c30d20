//! Error types for the sensors data service

use thiserror::Error;

/// Result type for sensors data operations
pub type SensorResult<T> = Result<T, SensorError>;

/// Error taxonomy for the sensors data service
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported aggregation: '{0}' has no engine mapping")]
    UnsupportedAggregation(String),

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Engine query error: {0}")]
    EngineQuery(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout error: operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Time range error: {0}")]
    TimeRange(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SensorError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new engine query error
    pub fn engine_query<S: Into<String>>(message: S) -> Self {
        Self::EngineQuery(message.into())
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection(message.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Check if this is a retriable error.
    ///
    /// Only transient connectivity failures qualify; everything else
    /// (validation, rejected queries, exhausted retries) is terminal.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            SensorError::Connection(_) | SensorError::Timeout { .. }
        )
    }

    /// Get the error category for status mapping and logging
    pub fn category(&self) -> &'static str {
        match self {
            SensorError::Validation(_) => "validation",
            SensorError::UnsupportedAggregation(_) => "unsupported_aggregation",
            SensorError::EngineUnavailable(_) => "engine_unavailable",
            SensorError::EngineQuery(_) => "engine_query",
            SensorError::Connection(_) => "connection",
            SensorError::Timeout { .. } => "timeout",
            SensorError::Configuration(_) => "configuration",
            SensorError::TimeRange(_) => "time_range",
            SensorError::Parse(_) => "parse",
            SensorError::Io(_) => "io",
            SensorError::Json(_) => "json",
        }
    }
}
