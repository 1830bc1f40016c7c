//! Queue layer for feed records
//!
//! The pipeline only ever talks to [`FeedQueue`]; the Redis-backed
//! [`QueueClient`] is the production implementation and [`InMemoryQueue`]
//! backs tests and local benchmarking.

mod client;
mod memory;


pub use client::QueueClient;
pub use memory::InMemoryQueue;

use async_trait::async_trait;
use std::time::Duration;

use crate::core::record::Record;
use crate::utils::error::Result;

/// FIFO queue of feed records
///
/// Implementations are safe for concurrent producers and consumers. The
/// layer never retries on its own: transport failures surface to the caller,
/// whose backoff policy decides what happens next.
#[async_trait]
pub trait FeedQueue: Send + Sync {
    /// Append records in order and return the resulting queue length
    ///
    /// Empty input is a no-op returning 0; no round-trip is issued.
    async fn enqueue_many(&self, records: &[Record]) -> Result<usize>;

    /// Take up to `batch_size` records, blocking up to `timeout` for the
    /// first one
    ///
    /// Once one record arrives, up to `batch_size - 1` more are drained
    /// without blocking. An empty result means the timeout passed with
    /// nothing available, which is a normal idle state and not an error.
    /// `batch_size == 0` returns empty immediately.
    async fn dequeue_batch(&self, batch_size: usize, timeout: Duration) -> Result<Vec<Record>>;

    /// Approximate number of records currently queued
    async fn pending(&self) -> Result<usize>;

    /// Drop all queued records; idempotent
    async fn purge(&self) -> Result<()>;

    /// Release the underlying transport; idempotent
    ///
    /// Operations invoked after `close` fail fast with a lifecycle error.
    async fn close(&self) -> Result<()>;
}
