//! End-to-end pipeline tests
//!
//! Drive the processor over the in-memory queue and verify batching,
//! failure isolation, shutdown latency, and throughput accounting.

#[cfg(test)]
mod tests {
    use crate::common::{self, CapturingTransform, FlakyTransform};
    use feedflow::monitoring::DEFAULT_WINDOW_CAPACITY;
    use feedflow::{BatchProcessor, FeedQueue, InMemoryQueue, ProcessorState, Record, Settings};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use uuid::Uuid;

    fn spawn_runner(
        processor: &Arc<BatchProcessor>,
    ) -> tokio::task::JoinHandle<feedflow::Result<()>> {
        let processor = processor.clone();
        tokio::spawn(async move { processor.run().await })
    }

    /// A preloaded queue drains in ceiling(records / batch_size) batches
    #[tokio::test]
    async fn test_preloaded_queue_drains_in_expected_batches() {
        let queue = Arc::new(InMemoryQueue::new());
        queue
            .enqueue_many(&common::make_records(120))
            .await
            .unwrap();

        let settings = Settings {
            batch_size: 50,
            ..common::fast_settings()
        };
        let processor = Arc::new(BatchProcessor::new(queue.clone(), &settings));
        let tracker = processor.tracker();
        let runner = spawn_runner(&processor);

        assert!(
            common::wait_for(Duration::from_secs(5), || {
                tracker.snapshot().records_total >= 120
            })
            .await
        );

        processor.stop();
        runner.await.unwrap().unwrap();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.records_total, 120);
        assert_eq!(snapshot.batches_total, 3);
        assert_eq!(queue.pending().await.unwrap(), 0);
        assert_eq!(processor.state(), ProcessorState::Stopped);
    }

    /// One failing record is counted, the rest of its batch survives
    #[tokio::test]
    async fn test_failing_record_does_not_abort_batch() {
        let queue = Arc::new(InMemoryQueue::new());
        let mut records = common::make_records(9);
        records.insert(4, common::poison_record());
        queue.enqueue_many(&records).await.unwrap();

        let transform = Arc::new(FlakyTransform::default());
        let processor = Arc::new(
            BatchProcessor::new(queue.clone(), &common::fast_settings())
                .with_transform(transform.clone()),
        );
        let tracker = processor.tracker();
        let runner = spawn_runner(&processor);

        assert!(
            common::wait_for(Duration::from_secs(5), || {
                tracker.snapshot().records_total >= 10
            })
            .await
        );

        processor.stop();
        runner.await.unwrap().unwrap();

        assert_eq!(transform.applied.load(Ordering::SeqCst), 10);
        assert_eq!(transform.succeeded.load(Ordering::SeqCst), 9);

        // the failed record still counts toward the metered batch
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.records_total, 10);
        assert_eq!(snapshot.batches_total, 1);
    }

    /// Stopping an idle pipeline returns within the dequeue timeout
    #[tokio::test]
    async fn test_stop_latency_bounded_by_dequeue_timeout() {
        let queue = Arc::new(InMemoryQueue::new());
        let settings = Settings {
            dequeue_timeout: 0.2,
            ..common::fast_settings()
        };
        let processor = Arc::new(BatchProcessor::new(queue, &settings));
        let runner = spawn_runner(&processor);

        // let the worker settle into its blocking dequeue
        tokio::time::sleep(Duration::from_millis(50)).await;

        let stopped_at = std::time::Instant::now();
        processor.stop();
        runner.await.unwrap().unwrap();

        assert!(
            stopped_at.elapsed() < Duration::from_millis(600),
            "shutdown took {:?}",
            stopped_at.elapsed()
        );
        assert_eq!(processor.state(), ProcessorState::Stopped);
    }

    /// Sixty processed batches keep only the fifty most recent in the window
    #[tokio::test]
    async fn test_throughput_window_caps_at_capacity() {
        let queue = Arc::new(InMemoryQueue::new());
        queue
            .enqueue_many(&common::make_records(120))
            .await
            .unwrap();

        let settings = Settings {
            batch_size: 2,
            ..common::fast_settings()
        };
        let processor = Arc::new(BatchProcessor::new(queue.clone(), &settings));
        let tracker = processor.tracker();
        let runner = spawn_runner(&processor);

        assert!(
            common::wait_for(Duration::from_secs(5), || {
                tracker.snapshot().records_total >= 120
            })
            .await
        );

        processor.stop();
        runner.await.unwrap().unwrap();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.batches_total, 60);
        assert_eq!(snapshot.window_len, DEFAULT_WINDOW_CAPACITY);
        assert_eq!(snapshot.records_total, 120);
    }

    /// Each batch stamps its records with one shared trace id
    #[tokio::test]
    async fn test_trace_ids_are_batch_scoped() {
        let queue = Arc::new(InMemoryQueue::new());
        queue.enqueue_many(&common::make_records(20)).await.unwrap();

        let transform = Arc::new(CapturingTransform::default());
        let settings = Settings {
            batch_size: 5,
            ..common::fast_settings()
        };
        let processor = Arc::new(
            BatchProcessor::new(queue.clone(), &settings).with_transform(transform.clone()),
        );
        let tracker = processor.tracker();
        let runner = spawn_runner(&processor);

        assert!(
            common::wait_for(Duration::from_secs(5), || {
                tracker.snapshot().records_total >= 20
            })
            .await
        );

        processor.stop();
        runner.await.unwrap().unwrap();

        let seen = transform.seen.lock().clone();
        assert_eq!(seen.len(), 20);

        let mut per_trace: HashMap<Uuid, usize> = HashMap::new();
        for (_, trace_id) in &seen {
            *per_trace.entry(*trace_id).or_default() += 1;
        }
        assert_eq!(per_trace.len(), 4, "expected one trace id per batch");
        assert!(per_trace.values().all(|&count| count == 5));
    }

    /// Totals equal the sum of every record pushed through the pipeline
    #[tokio::test]
    async fn test_totals_accumulate_across_waves() {
        let queue = Arc::new(InMemoryQueue::new());
        let settings = Settings {
            worker_concurrency: 2,
            ..common::fast_settings()
        };
        let processor = Arc::new(BatchProcessor::new(queue.clone(), &settings));
        let tracker = processor.tracker();
        let runner = spawn_runner(&processor);

        queue.enqueue_many(&common::make_records(30)).await.unwrap();
        assert!(
            common::wait_for(Duration::from_secs(5), || {
                tracker.snapshot().records_total >= 30
            })
            .await
        );

        queue.enqueue_many(&common::make_records(45)).await.unwrap();
        assert!(
            common::wait_for(Duration::from_secs(5), || {
                tracker.snapshot().records_total >= 75
            })
            .await
        );

        processor.stop();
        runner.await.unwrap().unwrap();
        assert_eq!(tracker.snapshot().records_total, 75);
    }

    /// The digest is stable across payload key order and tracks the id
    #[test]
    fn test_digest_identity() {
        let a = Record::new(serde_json::json!({"x": 1, "y": [1, 2]})).with_id("r1");
        let b = Record::new(serde_json::json!({"y": [1, 2], "x": 1})).with_id("r1");
        let c = Record::new(serde_json::json!({"x": 1, "y": [1, 2]})).with_id("r2");

        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
        assert_eq!(a.digest().len(), 64);
    }
}
