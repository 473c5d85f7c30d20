//! Engine client for the time-series store
//!
//! Talks to an InfluxDB 2.x compatible engine over its Flux HTTP query API
//! and decodes annotated CSV responses into raw records. The service core
//! depends only on the `SignalsStore` trait, not on this implementation.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;
use tracing::{debug, warn};

use homesensors_core::{
    error::{SensorError, SensorResult},
    flux::QuerySpec,
    query::RawRecord,
    signal::Signal,
};

use crate::config::InfluxConfig;

/// Read-side abstraction over the time-series engine
#[async_trait]
pub trait SignalsStore: Send + Sync {
    /// Execute a rendered query and return one record per signal per
    /// timestamp, as emitted by the engine.
    async fn query_records(&self, query: &QuerySpec) -> SensorResult<Vec<RawRecord>>;
}

/// InfluxDB 2.x client over the `/api/v2/query` endpoint
pub struct InfluxClient {
    http: Client,
    url: String,
    token: String,
    org: String,
    request_timeout: Duration,
}

impl InfluxClient {
    pub fn new(config: &InfluxConfig, request_timeout: Duration) -> SensorResult<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SensorError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: config.url(),
            token: config.token.clone(),
            org: config.org.clone(),
            request_timeout,
        })
    }
}

#[async_trait]
impl SignalsStore for InfluxClient {
    async fn query_records(&self, query: &QuerySpec) -> SensorResult<Vec<RawRecord>> {
        let endpoint = format!("{}/api/v2/query", self.url);
        debug!("Executing engine query against {}", endpoint);

        let response = self
            .http
            .post(&endpoint)
            .query(&[("org", self.org.as_str())])
            .header(header::AUTHORIZATION, format!("Token {}", self.token))
            .header(header::ACCEPT, "application/csv")
            .header(header::CONTENT_TYPE, "application/vnd.flux")
            .body(query.flux.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SensorError::Timeout {
                        timeout_ms: self.request_timeout.as_millis() as u64,
                    }
                } else {
                    SensorError::connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("(error body unavailable: {e})"));
            warn!(%status, query = %query.flux, "Engine rejected query: {}", body);
            return Err(SensorError::engine_query(format!(
                "engine returned {status}: {body}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SensorError::connection(e.to_string()))?;

        parse_annotated_csv(&body)
    }
}

/// Decode the engine's annotated CSV into raw records.
///
/// Tables are separated by blank lines; each table carries optional
/// annotation rows (starting with `#`) followed by a header row naming the
/// columns. Only the `_time`, `_field` and `_value` columns are consumed.
/// The schema emits no quoted fields, so splitting on commas is exact.
fn parse_annotated_csv(body: &str) -> SensorResult<Vec<RawRecord>> {
    let mut records = Vec::new();
    // (_time, _field, _value) column indexes for the current table
    let mut columns: Option<(usize, usize, usize)> = None;

    for line in body.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            // Table boundary; the next non-annotation row is a header.
            columns = None;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        match columns {
            None => {
                columns = Some((
                    column_index(&fields, "_time")?,
                    column_index(&fields, "_field")?,
                    column_index(&fields, "_value")?,
                ));
            }
            Some((time_idx, field_idx, value_idx)) => {
                let ts = cell(&fields, time_idx)?;
                let field = cell(&fields, field_idx)?;
                let raw_value = cell(&fields, value_idx)?;

                let signal: Signal = match field.parse() {
                    Ok(signal) => signal,
                    Err(_) => {
                        // The query filters fields, so anything else is an
                        // engine-side surprise; skip it rather than fail.
                        warn!("Skipping record with unknown field '{}'", field);
                        continue;
                    }
                };

                let value: f64 = raw_value.parse().map_err(|_| {
                    SensorError::parse(format!(
                        "non-numeric value '{raw_value}' for field '{field}' at {ts}"
                    ))
                })?;

                records.push(RawRecord::new(ts, signal, value));
            }
        }
    }

    Ok(records)
}

fn column_index(header: &[&str], name: &str) -> SensorResult<usize> {
    header
        .iter()
        .position(|column| *column == name)
        .ok_or_else(|| SensorError::parse(format!("engine response missing '{name}' column")))
}

fn cell<'a>(fields: &[&'a str], index: usize) -> SensorResult<&'a str> {
    fields
        .get(index)
        .copied()
        .ok_or_else(|| SensorError::parse("engine response row is shorter than its header".to_string()))
}
