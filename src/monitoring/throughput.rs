//! Sliding-window throughput tracker

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::time::Duration;

use super::bounded::BoundedPush;
use super::types::{BatchMeasurement, ThroughputSnapshot};

/// Number of recent batch measurements retained for window aggregates
pub const DEFAULT_WINDOW_CAPACITY: usize = 50;

/// All tracker state consolidated behind a single lock
///
/// One write per completed batch, one read per snapshot; aggregates are never
/// cached between the two.
#[derive(Debug, Default)]
struct TrackerStorage {
    window: VecDeque<BatchMeasurement>,
    total_records: u64,
    total_batches: u64,
    total_elapsed: Duration,
}

/// Concurrent throughput tracker shared by every worker loop
///
/// Recent history lives in a bounded sliding window (oldest evicted first)
/// while cumulative totals are monotone until `reset`. Snapshots are computed
/// on read, so they are always consistent with the totals at that instant.
#[derive(Debug)]
pub struct ThroughputTracker {
    window_capacity: usize,
    storage: RwLock<TrackerStorage>,
}

impl ThroughputTracker {
    /// Create a tracker with the default window capacity
    pub fn new() -> Self {
        Self::with_window_capacity(DEFAULT_WINDOW_CAPACITY)
    }

    /// Create a tracker with a custom window capacity (clamped to at least 1)
    pub fn with_window_capacity(capacity: usize) -> Self {
        Self {
            window_capacity: capacity.max(1),
            storage: RwLock::new(TrackerStorage::default()),
        }
    }

    /// Record one completed batch
    ///
    /// A zero record count is a no-op: empty dequeues are a normal idle state
    /// and must not dilute the window aggregates.
    pub fn record(&self, records: usize, elapsed: Duration, started_at: DateTime<Utc>) {
        if records == 0 {
            return;
        }

        let mut storage = self.storage.write();
        storage.window.push_bounded(
            BatchMeasurement {
                records,
                elapsed,
                started_at,
            },
            self.window_capacity,
        );
        storage.total_records += records as u64;
        storage.total_batches += 1;
        storage.total_elapsed += elapsed;
    }

    /// Compute the current aggregates
    pub fn snapshot(&self) -> ThroughputSnapshot {
        let storage = self.storage.read();

        let throughput_avg_window = if storage.window.is_empty() {
            0.0
        } else {
            storage
                .window
                .iter()
                .map(BatchMeasurement::throughput)
                .sum::<f64>()
                / storage.window.len() as f64
        };

        let throughput_peak_window = storage
            .window
            .iter()
            .map(BatchMeasurement::throughput)
            .fold(0.0, f64::max);

        let overall_secs = storage.total_elapsed.as_secs_f64();
        let throughput_avg_overall = if overall_secs <= 0.0 {
            0.0
        } else {
            storage.total_records as f64 / overall_secs
        };

        ThroughputSnapshot {
            records_total: storage.total_records,
            batches_total: storage.total_batches,
            window_len: storage.window.len(),
            throughput_avg_window,
            throughput_avg_overall,
            throughput_peak_window,
        }
    }

    /// Clear the window and all cumulative totals
    ///
    /// Intended for test and benchmark harnesses; the processor never resets
    /// mid-run.
    pub fn reset(&self) {
        *self.storage.write() = TrackerStorage::default();
    }
}

impl Default for ThroughputTracker {
    fn default() -> Self {
        Self::new()
    }
}
