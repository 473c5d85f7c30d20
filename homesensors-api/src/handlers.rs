//! HTTP handlers for the sensors data service

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use homesensors_core::{
    error::SensorError,
    query::{SignalsRequest, SignalsResponse},
    signal::Aggregation,
};

use crate::AppState;

/// Health check endpoint
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Metrics endpoint (Prometheus format)
pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state.provider.metrics().render_prometheus()
}

/// Averaged signals data endpoint; the body's aggregation, if any, is ignored
pub async fn signals_avg_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignalsRequest>,
) -> Result<Json<SignalsResponse>, (StatusCode, Json<Value>)> {
    process_signals(state, payload, Aggregation::Avg).await
}

/// Maximum signals data endpoint; the body's aggregation, if any, is ignored
pub async fn signals_max_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignalsRequest>,
) -> Result<Json<SignalsResponse>, (StatusCode, Json<Value>)> {
    process_signals(state, payload, Aggregation::Max).await
}

async fn process_signals(
    state: AppState,
    payload: SignalsRequest,
    aggregation: Aggregation,
) -> Result<Json<SignalsResponse>, (StatusCode, Json<Value>)> {
    debug!("Received signals data request: {:?}", payload);

    match state.provider.process(&payload, aggregation).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            let status = status_for(&err);
            if status.is_server_error() {
                error!("Signals query failed: {}", err);
            } else {
                warn!("Rejected signals request: {}", err);
            }

            Err((
                status,
                Json(json!({
                    "error": "Signals query failed",
                    "message": err.to_string(),
                    "category": err.category()
                })),
            ))
        }
    }
}

/// Map error categories to HTTP status codes so callers can tell a bad
/// request apart from an unavailable backend.
fn status_for(err: &SensorError) -> StatusCode {
    match err.category() {
        "validation" | "time_range" | "unsupported_aggregation" => StatusCode::BAD_REQUEST,
        "engine_unavailable" | "connection" | "timeout" => StatusCode::SERVICE_UNAVAILABLE,
        "engine_query" | "parse" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&SensorError::validation("x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&SensorError::UnsupportedAggregation("min".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&SensorError::EngineUnavailable("x".to_string())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&SensorError::engine_query("x")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&SensorError::configuration("x")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
