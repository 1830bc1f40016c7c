//! Worker loop and bounded batch fan-out

use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, watch};
use tracing::{Instrument, Span, debug, field, info_span, warn};

use super::types::{BatchContext, BatchOutcome};
use crate::core::record::Record;
use crate::core::transform::RecordTransform;
use crate::monitoring::ThroughputTracker;
use crate::queue::FeedQueue;

/// Pause before retrying the queue after a transport error
pub(super) const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Everything one worker loop needs, cloned out of the processor at spawn
pub(super) struct WorkerContext {
    pub worker_id: usize,
    pub queue: Arc<dyn FeedQueue>,
    pub transform: Arc<dyn RecordTransform>,
    pub tracker: Arc<ThroughputTracker>,
    pub pool: Arc<Semaphore>,
    pub batch_size: usize,
    pub dequeue_timeout: Duration,
    pub flush_interval: Duration,
    pub tracing_enabled: bool,
    pub stop: watch::Receiver<bool>,
}

impl WorkerContext {
    /// Drive the dequeue loop until stop is observed
    pub(super) async fn run(mut self) {
        let span = if self.tracing_enabled {
            info_span!("feed.worker", feed.worker.id = self.worker_id)
        } else {
            Span::none()
        };
        let worker_id = self.worker_id;

        async move {
            debug!(worker = worker_id, "Worker loop started");
            self.work_loop().await;
            debug!(worker = worker_id, "Worker loop exited");
        }
        .instrument(span)
        .await
    }

    async fn work_loop(&mut self) {
        while !*self.stop.borrow() {
            match self
                .queue
                .dequeue_batch(self.batch_size, self.dequeue_timeout)
                .await
            {
                // An empty dequeue is normal idle behavior; go straight back
                // to blocking on the queue.
                Ok(batch) if batch.is_empty() => continue,
                Ok(batch) => {
                    self.handle_batch(batch).await;
                    if !self.flush_interval.is_zero() {
                        self.stop_aware_sleep(self.flush_interval).await;
                    }
                }
                Err(error) => {
                    warn!(
                        worker = self.worker_id,
                        %error,
                        "Dequeue failed, backing off before retry"
                    );
                    self.stop_aware_sleep(RETRY_BACKOFF).await;
                }
            }
        }
    }

    /// Process one non-empty batch: span, fan-out, metrics
    async fn handle_batch(&self, batch: Vec<Record>) {
        let context = BatchContext::new(self.worker_id);
        let batch_len = batch.len();

        let span = if self.tracing_enabled {
            info_span!(
                "feed.batch",
                feed.worker.id = self.worker_id,
                feed.batch.size = batch_len,
                feed.batch.elapsed_ms = field::Empty,
                feed.batch.throughput = field::Empty,
                feed.batch.success_count = field::Empty,
                trace_id = %context.trace_id,
            )
        } else {
            Span::none()
        };

        let started_at = Utc::now();
        let started = Instant::now();
        let outcome = fan_out(&self.transform, &self.pool, batch, &context)
            .instrument(span.clone())
            .await;
        let elapsed = started.elapsed();

        let secs = elapsed.as_secs_f64();
        let throughput = if secs <= 0.0 {
            0.0
        } else {
            batch_len as f64 / secs
        };

        span.record("feed.batch.elapsed_ms", elapsed.as_millis() as u64);
        span.record("feed.batch.throughput", throughput);
        span.record("feed.batch.success_count", outcome.success_count() as u64);
        if outcome.failures > 0 {
            let _entered = span.enter();
            warn!(count = outcome.failures, "feed.batch.failures");
        }

        self.tracker.record(batch_len, elapsed, started_at);
    }

    /// Sleep that cuts short as soon as stop is signalled
    async fn stop_aware_sleep(&mut self, duration: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = self.stop.changed() => {}
        }
    }
}

/// Fan a batch out over the shared bounded pool
///
/// Submission blocks on a pool permit, which is the backpressure bound on
/// in-flight transforms across all workers. `join_all` yields results in
/// submission order so outputs stay in batch position order. A failed or
/// panicked transform is counted and its siblings keep going.
pub(super) async fn fan_out(
    transform: &Arc<dyn RecordTransform>,
    pool: &Arc<Semaphore>,
    batch: Vec<Record>,
    context: &BatchContext,
) -> BatchOutcome {
    let total = batch.len();
    let mut handles = Vec::with_capacity(total);
    let mut failures = 0usize;

    for (position, record) in batch.into_iter().enumerate() {
        let permit = match pool.clone().acquire_owned().await {
            Ok(permit) => permit,
            // Only possible if the pool is closed, which the processor never
            // does while batches are in flight.
            Err(_) => {
                failures += total - position;
                debug!("Processing pool closed mid-batch");
                break;
            }
        };

        let transform = transform.clone();
        let trace_id = context.trace_id;
        handles.push(tokio::spawn(async move {
            let result = transform.apply(record, position, trace_id).await;
            drop(permit);
            result
        }));
    }

    let mut processed = Vec::with_capacity(handles.len());
    for result in join_all(handles).await {
        match result {
            Ok(Ok(record)) => processed.push(record),
            Ok(Err(error)) => {
                failures += 1;
                debug!(%error, "Record transform failed");
            }
            Err(join_error) => {
                failures += 1;
                debug!(%join_error, "Record transform panicked");
            }
        }
    }

    BatchOutcome {
        processed,
        failures,
    }
}
