//! Sensors data provider: query construction, execution and reshaping
//!
//! Orchestrates one request end to end: validate, build the Flux query,
//! execute it against the engine bounded by a timeout with a single retry,
//! pivot the raw records and wrap them with the echoed request metadata.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use homesensors_core::{
    error::{SensorError, SensorResult},
    flux::{build_signals_query, QuerySpec},
    pivot::pivot_records,
    query::{RawRecord, SignalsRequest, SignalsResponse},
    signal::Aggregation,
};

use crate::config::ApiConfig;
use crate::engine::SignalsStore;
use crate::metrics::ProviderMetrics;

/// Aggregations the HTTP surface exposes. Checked against the engine
/// mapping table at startup so a mismatch fails fast instead of at
/// request time.
pub const EXPOSED_AGGREGATIONS: &[Aggregation] = &[Aggregation::Avg, Aggregation::Max];

/// Provider for aggregated data from the BME280 sensors
pub struct SensorsDataProvider {
    store: Arc<dyn SignalsStore>,
    config: Arc<ApiConfig>,
    metrics: ProviderMetrics,
}

impl SensorsDataProvider {
    /// Create a new provider, verifying the aggregation mapping table
    pub fn new(store: Arc<dyn SignalsStore>, config: Arc<ApiConfig>) -> SensorResult<Self> {
        for aggregation in EXPOSED_AGGREGATIONS {
            if aggregation.flux_function().is_err() {
                return Err(SensorError::configuration(format!(
                    "exposed aggregation '{aggregation}' has no engine mapping"
                )));
            }
        }

        Ok(Self {
            store,
            config,
            metrics: ProviderMetrics::new(),
        })
    }

    pub fn metrics(&self) -> &ProviderMetrics {
        &self.metrics
    }

    /// Process one signals-data request.
    ///
    /// Validation failures never reach the engine. The caller-supplied
    /// aggregation comes from the route, not the request body.
    pub async fn process(
        &self,
        request: &SignalsRequest,
        aggregation: Aggregation,
    ) -> SensorResult<SignalsResponse> {
        let started = Instant::now();

        let result = self.process_inner(request, aggregation).await;
        match &result {
            Ok(response) => {
                self.metrics.record_query(started.elapsed(), response.data.len());
                info!(
                    rows = response.data.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    aggregation = %aggregation,
                    "Signals query completed"
                );
            }
            Err(_) => self.metrics.record_error(),
        }
        result
    }

    async fn process_inner(
        &self,
        request: &SignalsRequest,
        aggregation: Aggregation,
    ) -> SensorResult<SignalsResponse> {
        request.validate_self()?;
        let range = request.time_range()?;

        let query = build_signals_query(
            &self.config.influx.bucket,
            &range,
            request.resolution,
            request.location,
            &request.signals,
            aggregation,
        )?;
        debug!(query = %query.flux, "Built engine query");

        let records = self.execute_with_retry(&query).await?;
        let data = pivot_records(&records);

        Ok(SignalsResponse {
            start_datetime: request.start_datetime.clone(),
            end_datetime: request.end_datetime.clone(),
            resolution: request.resolution,
            aggregation,
            data,
        })
    }

    /// Execute the engine query with a single bounded retry.
    ///
    /// Only transient connectivity failures are retried; a second one
    /// surfaces as `EngineUnavailable`. Rejected queries are never retried.
    async fn execute_with_retry(&self, query: &QuerySpec) -> SensorResult<Vec<RawRecord>> {
        match self.execute_once(query).await {
            Ok(records) => Ok(records),
            Err(err) if err.is_retriable() => {
                warn!("Engine call failed ({}), retrying once", err);
                sleep(Duration::from_millis(self.config.query.retry_backoff_ms)).await;

                match self.execute_once(query).await {
                    Ok(records) => Ok(records),
                    Err(retry_err) if retry_err.is_retriable() => {
                        error!(query = %query.flux, "Engine unavailable after retry: {}", retry_err);
                        Err(SensorError::EngineUnavailable(retry_err.to_string()))
                    }
                    Err(retry_err) => Err(retry_err),
                }
            }
            Err(err) => {
                if matches!(err, SensorError::EngineQuery(_)) {
                    error!(query = %query.flux, "Engine rejected query: {}", err);
                }
                Err(err)
            }
        }
    }

    /// One engine call, bounded by the configured timeout
    async fn execute_once(&self, query: &QuerySpec) -> SensorResult<Vec<RawRecord>> {
        let deadline = Duration::from_millis(self.config.query.query_timeout_ms);
        match timeout(deadline, self.store.query_records(query)).await {
            Ok(result) => result,
            Err(_) => Err(SensorError::Timeout {
                timeout_ms: deadline.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use homesensors_core::{
        query::SignalsRequest,
        signal::{Location, Resolution, Signal},
    };

    /// Store that plays back a scripted sequence of results, one per call
    struct SequenceStore {
        responses: Mutex<Vec<SensorResult<Vec<RawRecord>>>>,
        calls: AtomicUsize,
    }

    impl SequenceStore {
        fn new(responses: Vec<SensorResult<Vec<RawRecord>>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SignalsStore for SequenceStore {
        async fn query_records(&self, _query: &QuerySpec) -> SensorResult<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                panic!("store called more times than scripted");
            }
            responses.remove(0)
        }
    }

    fn provider(store: Arc<SequenceStore>) -> SensorsDataProvider {
        let mut config = ApiConfig::default();
        config.query.retry_backoff_ms = 1;
        SensorsDataProvider::new(store, Arc::new(config)).unwrap()
    }

    fn request() -> SignalsRequest {
        SignalsRequest {
            start_datetime: "2025-01-01T00:00:00".to_string(),
            end_datetime: "2025-01-01T02:00:00".to_string(),
            resolution: Some(Resolution::Hour),
            location: Location::Office,
            signals: vec![Signal::Temperature],
        }
    }

    #[tokio::test]
    async fn test_retry_failing_non_retriably_keeps_its_own_kind() {
        // First attempt transient, retry rejected by the engine: the
        // rejection surfaces as engine_query, not engine_unavailable.
        let store = SequenceStore::new(vec![
            Err(SensorError::connection("connection reset")),
            Err(SensorError::engine_query("compilation failed")),
        ]);

        let err = provider(store.clone())
            .process(&request(), Aggregation::Avg)
            .await
            .unwrap_err();

        assert_eq!(err.category(), "engine_query");
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_second_transient_failure_becomes_engine_unavailable() {
        let store = SequenceStore::new(vec![
            Err(SensorError::Timeout { timeout_ms: 50 }),
            Err(SensorError::connection("connection refused")),
        ]);

        let err = provider(store.clone())
            .process(&request(), Aggregation::Avg)
            .await
            .unwrap_err();

        assert_eq!(err.category(), "engine_unavailable");
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_rejected_query_is_terminal_on_first_attempt() {
        let store = SequenceStore::new(vec![Err(SensorError::engine_query("bad flux"))]);

        let err = provider(store.clone())
            .process(&request(), Aggregation::Avg)
            .await
            .unwrap_err();

        assert_eq!(err.category(), "engine_query");
        assert_eq!(store.calls(), 1);
    }
}
