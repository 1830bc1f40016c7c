//! Types for throughput tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One completed batch as seen by the tracker
#[derive(Debug, Clone)]
pub struct BatchMeasurement {
    /// Records in the batch
    pub records: usize,
    /// Wall time spent processing the batch
    pub elapsed: Duration,
    /// When batch processing began
    pub started_at: DateTime<Utc>,
}

impl BatchMeasurement {
    /// Records per second for this measurement
    ///
    /// A zero elapsed time yields 0.0 rather than a division error; `Duration`
    /// is unsigned so the guard only needs to cover zero.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.records as f64 / secs
        }
    }
}

/// Point-in-time aggregate over the sliding window and cumulative totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThroughputSnapshot {
    /// Records processed since startup (or the last reset)
    pub records_total: u64,
    /// Batches processed since startup (or the last reset)
    pub batches_total: u64,
    /// Measurements currently held in the sliding window
    pub window_len: usize,
    /// Mean per-batch throughput across the window, records per second
    pub throughput_avg_window: f64,
    /// Cumulative records over cumulative processing time, records per second
    pub throughput_avg_overall: f64,
    /// Highest per-batch throughput in the window, records per second
    pub throughput_peak_window: f64,
}
