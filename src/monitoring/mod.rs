//! Throughput monitoring for the batch pipeline
//!
//! Worker loops report one measurement per completed batch; aggregates are
//! derived on read so the hot path stays a single short-lived lock write.

mod bounded;
mod throughput;
mod types;


pub use throughput::{DEFAULT_WINDOW_CAPACITY, ThroughputTracker};
pub use types::{BatchMeasurement, ThroughputSnapshot};
