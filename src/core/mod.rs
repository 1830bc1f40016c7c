//! Core record processing for the feed pipeline
//!
//! This module contains the record envelope, the transform seam, and the
//! batch processor that drives them.

pub mod processor;
pub mod record;
pub mod transform;

// Re-export commonly used types
pub use processor::{BatchContext, BatchOutcome, BatchProcessor, ProcessorState};
pub use record::{ProcessedRecord, Record};
pub use transform::{DigestTransform, RecordTransform};
