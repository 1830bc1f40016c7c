//! Processor state machine and per-batch bookkeeping types

use uuid::Uuid;

use crate::core::record::ProcessedRecord;

/// Lifecycle of a processor instance
///
/// The only legal path is Idle → Running → Draining → Stopped; a stopped
/// instance is never restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProcessorState {
    /// Constructed but not yet running
    Idle = 0,
    /// Worker loops are consuming the queue
    Running = 1,
    /// Stop observed; workers winding down, pool draining
    Draining = 2,
    /// All workers joined and in-flight transforms finished
    Stopped = 3,
}

impl ProcessorState {
    /// Decode the atomic state cell
    pub(super) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            2 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// Identity shared by every record processed in one dequeue cycle
#[derive(Debug, Clone)]
pub struct BatchContext {
    /// Worker loop that pulled the batch
    pub worker_id: usize,
    /// Trace id inherited by every processed record in the batch
    pub trace_id: Uuid,
}

impl BatchContext {
    /// New context with a fresh trace id
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            trace_id: Uuid::new_v4(),
        }
    }
}

/// Outcome of fanning out one batch
///
/// Failures are counted, never returned as errors: one bad record must not
/// take down its siblings or the worker loop.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Successfully transformed records, in batch position order
    pub processed: Vec<ProcessedRecord>,
    /// Records whose transform returned an error or panicked
    pub failures: usize,
}

impl BatchOutcome {
    /// Number of records that made it through the transform
    pub fn success_count(&self) -> usize {
        self.processed.len()
    }
}
