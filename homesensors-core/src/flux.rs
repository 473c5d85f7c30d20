//! Flux query construction for the time-series engine
//!
//! Pure construction only; executing the query is the engine client's job.

use crate::error::{SensorError, SensorResult};
use crate::signal::{Aggregation, Location, Resolution, Signal};
use crate::time::TimeRange;

/// The measurement all BME280 sensor samples are written under
pub const MEASUREMENT: &str = "bme280_signals";

/// A fully rendered engine query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub flux: String,
}

/// Build the Flux query for one signals-data request.
///
/// The filter is the disjunction over the requested signals matched against
/// `_field`, conjoined with the fixed measurement filter and an exact-match
/// location tag filter. Range bounds are embedded as UTC RFC 3339 instants.
pub fn build_signals_query(
    bucket: &str,
    range: &TimeRange,
    window: Option<Resolution>,
    location: Location,
    signals: &[Signal],
    aggregation: Aggregation,
) -> SensorResult<QuerySpec> {
    if signals.is_empty() {
        return Err(SensorError::validation("signals must not be empty"));
    }

    let function = aggregation.flux_function()?;
    let every = window.unwrap_or(Resolution::DEFAULT).flux_every();

    // Signals have set semantics; drop duplicates while keeping order.
    let mut seen: Vec<Signal> = Vec::with_capacity(signals.len());
    for signal in signals {
        if !seen.contains(signal) {
            seen.push(*signal);
        }
    }
    let field_filter = seen
        .iter()
        .map(|signal| format!("r[\"_field\"] == \"{signal}\""))
        .collect::<Vec<_>>()
        .join(" or ");

    let flux = format!(
        "from(bucket: \"{bucket}\")\n\
         \x20 |> range(start: time(v: \"{start}\"), stop: time(v: \"{stop}\"))\n\
         \x20 |> filter(fn: (r) => r._measurement == \"{MEASUREMENT}\")\n\
         \x20 |> filter(fn: (r) => {field_filter})\n\
         \x20 |> filter(fn: (r) => r.location == \"{location}\")\n\
         \x20 |> aggregateWindow(every: {every}, fn: {function}, createEmpty: false)",
        start = range.start_rfc3339(),
        stop = range.end_rfc3339(),
    );

    Ok(QuerySpec { flux })
}
