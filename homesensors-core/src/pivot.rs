//! Pivoting raw engine records into per-timestamp rows
//!
//! The engine emits one record per signal per timestamp. Callers want one
//! row per timestamp carrying all requested signals, ascending by time.

use std::collections::BTreeMap;

use crate::query::{DataRow, RawRecord};
use crate::signal::Signal;

/// Fold raw records into one row per distinct timestamp.
///
/// Rows come back sorted ascending by timestamp string; for RFC 3339
/// instants string order is chronological order. Duplicate
/// (timestamp, signal) pairs should not occur under the query's grouping,
/// but when they do the last record wins.
pub fn pivot_records(records: &[RawRecord]) -> Vec<DataRow> {
    let mut buckets: BTreeMap<&str, BTreeMap<Signal, f64>> = BTreeMap::new();

    for record in records {
        buckets
            .entry(record.ts.as_str())
            .or_default()
            .insert(record.signal, record.value);
    }

    buckets
        .into_iter()
        .map(|(ts, values)| DataRow {
            ts: ts.to_string(),
            values,
        })
        .collect()
}
