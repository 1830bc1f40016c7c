//! Batch processing over the feed queue
//!
//! Worker loops, the bounded transform pool, and the processor lifecycle
//! live here.

mod core;
mod types;
mod worker;


// Re-export all public types
pub use self::core::BatchProcessor;
pub use types::{BatchContext, BatchOutcome, ProcessorState};
