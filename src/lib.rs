//! # Feedflow
//!
//! An asynchronous feed-ingestion batch processor. Worker loops drain a
//! Redis-backed queue in batches, fan each batch out across a bounded
//! processing pool, and report throughput over a sliding window.
//!
//! ## Features
//!
//! - **Redis-backed queue**: bulk enqueue plus blocking, timed bulk dequeue
//! - **Bounded processing**: a shared pool caps in-flight record transforms
//! - **Throughput tracking**: windowed and cumulative rates, computed on read
//! - **Trace propagation**: per-batch spans whose trace id lands on every record
//! - **Graceful shutdown**: Ctrl-C / SIGTERM drain the pipeline and close the queue
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use feedflow::{FeedService, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_env()?;
//!     let service = FeedService::new(&settings).await?;
//!     service.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feeding the queue
//!
//! ```rust,no_run
//! use feedflow::{FeedQueue, QueueClient, Record};
//! use serde_json::json;
//!
//! # async fn demo() -> feedflow::Result<()> {
//! let queue = QueueClient::connect("redis://localhost:6379", "feed:inbound").await?;
//! let queued = queue.enqueue_many(&[Record::new(json!({"user": 42}))]).await?;
//! println!("queue length: {}", queued);
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

// Public module exports
pub mod config;
pub mod core;
pub mod monitoring;
pub mod queue;
pub mod service;
pub mod telemetry;
pub mod utils;

// Re-export main types
pub use config::{LogLevel, Settings};
pub use crate::core::{
    BatchContext, BatchOutcome, BatchProcessor, DigestTransform, ProcessedRecord, ProcessorState,
    Record, RecordTransform,
};
pub use monitoring::{ThroughputSnapshot, ThroughputTracker};
pub use queue::{FeedQueue, InMemoryQueue, QueueClient};
pub use service::FeedService;
pub use utils::error::{FeedError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Pipeline build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp (seconds since the epoch)
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: env!("BUILD_TIME"),
            git_hash: env!("GIT_HASH"),
            rust_version: env!("RUST_VERSION"),
        }
    }
}

/// Build metadata captured at compile time
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
