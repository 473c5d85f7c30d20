//! Home Sensors Data API service library
//!
//! This library provides the components of the sensors data service:
//! configuration, the engine client, the data provider and HTTP handlers.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod engine;
pub mod handlers;
pub mod metrics;
pub mod provider;

use config::ApiConfig;
use provider::SensorsDataProvider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<SensorsDataProvider>,
    pub config: Arc<ApiConfig>,
}

/// Build the service router. Shared with the integration tests so they
/// exercise the exact production routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/v0/signals_data/avg", post(handlers::signals_avg_handler))
        .route("/v0/signals_data/max", post(handlers::signals_max_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
