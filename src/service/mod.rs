//! Service wiring and lifecycle control
//!
//! [`FeedService`] assembles the queue client, the throughput tracker, and
//! the batch processor, then supervises them until completion or a shutdown
//! signal. Whatever way a run ends, the queue connection is closed before
//! the result is returned.

pub mod signal;

use crate::config::Settings;
use crate::core::BatchProcessor;
use crate::monitoring::ThroughputTracker;
use crate::queue::{FeedQueue, QueueClient};
use crate::utils::error::{FeedError, Result};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

/// Supervisor for the ingestion pipeline
pub struct FeedService {
    queue: Arc<dyn FeedQueue>,
    processor: Arc<BatchProcessor>,
}

impl FeedService {
    /// Connect to Redis and assemble the processing pipeline.
    ///
    /// Settings are validated and the queue connection health-checked
    /// before anything is spawned, so misconfiguration surfaces here.
    pub async fn new(settings: &Settings) -> Result<Self> {
        info!("Initializing feed service");
        settings.validate()?;

        debug!("Connecting queue client");
        let queue: Arc<dyn FeedQueue> =
            Arc::new(QueueClient::connect(&settings.redis_url, &settings.queue_name).await?);

        let service = Self::assemble(queue, settings);
        info!("Feed service initialized");
        Ok(service)
    }

    /// Assemble the pipeline over an already constructed queue.
    pub fn with_queue(queue: Arc<dyn FeedQueue>, settings: &Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::assemble(queue, settings))
    }

    fn assemble(queue: Arc<dyn FeedQueue>, settings: &Settings) -> Self {
        let processor = Arc::new(BatchProcessor::new(queue.clone(), settings));
        Self { queue, processor }
    }

    /// Drive the processor until it finishes or a shutdown signal arrives.
    pub async fn run(&self) -> Result<()> {
        let processor = self.processor.clone();
        let mut runner = tokio::spawn(async move { processor.run().await });

        let result = tokio::select! {
            joined = &mut runner => flatten_join(joined),
            _ = signal::shutdown_signal() => {
                info!("Shutdown signal received, draining workers");
                self.processor.stop();
                flatten_join(runner.await)
            }
        };

        // Every exit path funnels through here, so the connection is
        // released whether the run succeeded, failed, or was signalled.
        if let Err(e) = self.queue.close().await {
            warn!("Failed to close queue client: {}", e);
        }

        let snapshot = self.processor.tracker().snapshot();
        info!(
            records = snapshot.records_total,
            batches = snapshot.batches_total,
            throughput = snapshot.throughput_avg_overall,
            "Feed service stopped"
        );

        result
    }

    /// Request a stop; idempotent and safe to call from any task.
    pub fn stop(&self) {
        self.processor.stop();
    }

    /// The processor backing this service.
    pub fn processor(&self) -> &BatchProcessor {
        &self.processor
    }

    /// The shared throughput tracker.
    pub fn tracker(&self) -> Arc<ThroughputTracker> {
        self.processor.tracker()
    }
}

fn flatten_join(joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result,
        Err(e) => Err(FeedError::lifecycle(format!("Processor task failed: {}", e))),
    }
}
