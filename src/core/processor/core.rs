//! Batch processor: construction, state machine, run and stop

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::{Semaphore, watch};
use tracing::{error, info};

use super::types::{BatchContext, BatchOutcome, ProcessorState};
use super::worker::{WorkerContext, fan_out};
use crate::config::Settings;
use crate::core::record::Record;
use crate::core::transform::{DigestTransform, RecordTransform};
use crate::monitoring::ThroughputTracker;
use crate::queue::FeedQueue;
use crate::utils::error::{FeedError, Result};

/// Concurrent batch processor over a shared feed queue
///
/// `worker_concurrency` independent loops dequeue from one queue and fan
/// records out over one bounded pool of `processing_workers` transform slots.
/// The instance runs once: Idle → Running → Draining → Stopped.
pub struct BatchProcessor {
    queue: Arc<dyn FeedQueue>,
    transform: Arc<dyn RecordTransform>,
    tracker: Arc<ThroughputTracker>,
    settings: Settings,
    /// Shared transform pool; permits bound in-flight work across workers
    pool: Arc<Semaphore>,
    /// Cooperative stop flag; workers observe it between batches
    stop_tx: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
    state: AtomicU8,
}

impl BatchProcessor {
    /// Create a processor with the default digest transform
    pub fn new(queue: Arc<dyn FeedQueue>, settings: &Settings) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            queue,
            transform: Arc::new(DigestTransform),
            tracker: Arc::new(ThroughputTracker::new()),
            pool: Arc::new(Semaphore::new(settings.processing_workers.max(1))),
            settings: settings.clone(),
            stop_tx: Arc::new(stop_tx),
            stop_rx,
            state: AtomicU8::new(ProcessorState::Idle as u8),
        }
    }

    /// Replace the per-record transform
    pub fn with_transform(mut self, transform: Arc<dyn RecordTransform>) -> Self {
        self.transform = transform;
        self
    }

    /// Shared throughput tracker for this processor
    pub fn tracker(&self) -> Arc<ThroughputTracker> {
        self.tracker.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> ProcessorState {
        ProcessorState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Run the worker loops until stop, then drain in-flight transforms
    ///
    /// Returns an error only when called on an instance that is not Idle.
    /// Worker panics during shutdown are logged, never propagated.
    pub async fn run(&self) -> Result<()> {
        self.state
            .compare_exchange(
                ProcessorState::Idle as u8,
                ProcessorState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|actual| {
                FeedError::lifecycle(format!(
                    "processor cannot start from {:?} state",
                    ProcessorState::from_u8(actual)
                ))
            })?;

        let workers = self.settings.worker_concurrency.max(1);
        info!(
            workers,
            processing_workers = self.settings.processing_workers,
            batch_size = self.settings.batch_size,
            "Batch processor starting"
        );

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let context = WorkerContext {
                worker_id,
                queue: self.queue.clone(),
                transform: self.transform.clone(),
                tracker: self.tracker.clone(),
                pool: self.pool.clone(),
                batch_size: self.settings.batch_size,
                dequeue_timeout: self.settings.dequeue_timeout(),
                flush_interval: self.settings.flush_interval(),
                tracing_enabled: self.settings.tracing_enabled,
                stop: self.stop_rx.clone(),
            };
            handles.push(tokio::spawn(context.run()));
        }

        for handle in handles {
            if let Err(join_error) = handle.await {
                error!(%join_error, "Worker task aborted");
            }
        }

        // Workers are gone; wait for every in-flight transform to hand its
        // permit back before declaring the instance stopped.
        self.state
            .store(ProcessorState::Draining as u8, Ordering::Release);
        let permits = self.settings.processing_workers.max(1) as u32;
        if let Ok(all) = self.pool.acquire_many(permits).await {
            drop(all);
        }
        self.state
            .store(ProcessorState::Stopped as u8, Ordering::Release);

        info!("Batch processor stopped");
        Ok(())
    }

    /// Request a cooperative stop; idempotent
    ///
    /// Workers finish their current batch, the pool finishes in-flight
    /// transforms, and `run` returns. An in-flight blocking dequeue ends
    /// within its timeout, which bounds how long shutdown can take.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
        if self
            .state
            .compare_exchange(
                ProcessorState::Running as u8,
                ProcessorState::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            info!("Batch processor draining");
        }
    }

    /// Fan one batch out over the processing pool
    ///
    /// This is the same path the worker loops use; it never touches the
    /// tracker, so callers own their own metering.
    pub async fn process_batch(&self, batch: Vec<Record>, context: &BatchContext) -> BatchOutcome {
        fan_out(&self.transform, &self.pool, batch, context).await
    }
}

impl std::fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("state", &self.state())
            .field("batch_size", &self.settings.batch_size)
            .field("worker_concurrency", &self.settings.worker_concurrency)
            .field("processing_workers", &self.settings.processing_workers)
            .finish()
    }
}
