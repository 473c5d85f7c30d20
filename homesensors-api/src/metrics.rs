//! Metrics collection and reporting for the sensors data service

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Thread-safe metrics collector for the data provider
#[derive(Debug)]
pub struct ProviderMetrics {
    /// Total queries processed successfully
    pub queries_total: AtomicU64,

    /// Total failed requests
    pub errors_total: AtomicU64,

    /// Total pivoted rows returned
    pub rows_returned_total: AtomicU64,

    /// Total query execution time
    pub query_time_total_ms: AtomicU64,

    /// Service start time
    start_time: Instant,
}

impl Default for ProviderMetrics {
    fn default() -> Self {
        Self {
            queries_total: AtomicU64::new(0),
            errors_total: AtomicU64::new(0),
            rows_returned_total: AtomicU64::new(0),
            query_time_total_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl ProviderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed query
    pub fn record_query(&self, duration: Duration, rows_returned: usize) {
        self.queries_total.fetch_add(1, Ordering::Relaxed);
        self.rows_returned_total
            .fetch_add(rows_returned as u64, Ordering::Relaxed);
        self.query_time_total_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed request
    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Render the counters in Prometheus text exposition format
    pub fn render_prometheus(&self) -> String {
        format!(
            "# HELP sensors_queries_total Total number of signals queries processed\n\
             # TYPE sensors_queries_total counter\n\
             sensors_queries_total {}\n\
             # HELP sensors_query_errors_total Total number of failed requests\n\
             # TYPE sensors_query_errors_total counter\n\
             sensors_query_errors_total {}\n\
             # HELP sensors_rows_returned_total Total number of pivoted rows returned\n\
             # TYPE sensors_rows_returned_total counter\n\
             sensors_rows_returned_total {}\n\
             # HELP sensors_query_time_total_ms Total query execution time in milliseconds\n\
             # TYPE sensors_query_time_total_ms counter\n\
             sensors_query_time_total_ms {}\n\
             # HELP sensors_uptime_seconds Service uptime in seconds\n\
             # TYPE sensors_uptime_seconds gauge\n\
             sensors_uptime_seconds {}\n",
            self.queries_total.load(Ordering::Relaxed),
            self.errors_total.load(Ordering::Relaxed),
            self.rows_returned_total.load(Ordering::Relaxed),
            self.query_time_total_ms.load(Ordering::Relaxed),
            self.uptime_seconds(),
        )
    }
}
