//! Record transform trait and the default digest transform

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::record::{ProcessedRecord, Record};
use crate::utils::error::Result;

/// Per-record processing step applied during batch fan-out
///
/// Implementations run concurrently on the bounded pool, so they must be
/// cheap to share. An `Err` from `apply` marks that record as failed without
/// affecting its batch siblings.
#[async_trait]
pub trait RecordTransform: Send + Sync {
    /// Transform one record into its processed form
    ///
    /// `position` is the record's offset within its batch and `trace_id` is
    /// the batch trace every output inherits.
    async fn apply(
        &self,
        record: Record,
        position: usize,
        trace_id: Uuid,
    ) -> Result<ProcessedRecord>;
}

/// Default transform: stamp each record with its content digest
///
/// Stateless and idempotent. Reprocessing a record yields the same digest,
/// which is what makes at-least-once delivery safe downstream.
#[derive(Debug, Clone, Default)]
pub struct DigestTransform;

#[async_trait]
impl RecordTransform for DigestTransform {
    async fn apply(
        &self,
        record: Record,
        position: usize,
        trace_id: Uuid,
    ) -> Result<ProcessedRecord> {
        let digest = record.digest();
        Ok(ProcessedRecord {
            record,
            digest,
            position,
            trace_id,
            processed_at: Utc::now(),
        })
    }
}
