//! Core types for the Home Sensors Data API
//!
//! This crate holds the pure, I/O-free parts of the service: the closed
//! request vocabularies, request/response models, the Flux query builder
//! and the result pivot. The HTTP surface and the engine client live in
//! the `homesensors-api` crate.

pub mod error;
pub mod flux;
pub mod pivot;
pub mod query;
pub mod signal;
pub mod time;

// Re-export commonly used types
pub use error::{SensorError, SensorResult};
