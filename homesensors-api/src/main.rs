use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

use homesensors_api::{
    config::ApiConfig, engine::InfluxClient, provider::SensorsDataProvider, router, AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Arc::new(ApiConfig::load()?);
    config.validate()?;
    info!("Loaded configuration: {:?}", config);

    // Initialize the engine client and data provider
    let store = Arc::new(InfluxClient::new(
        &config.influx,
        Duration::from_millis(config.query.query_timeout_ms),
    )?);
    let provider = Arc::new(SensorsDataProvider::new(store, config.clone())?);
    info!("Initialized sensors data provider");

    // Create shared state
    let state = AppState {
        provider,
        config: config.clone(),
    };

    // Build router and start server
    let app = router(state);
    let listener = TcpListener::bind(&config.bind_address).await?;
    let addr = listener.local_addr()?;
    info!("Home Sensors Data API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
