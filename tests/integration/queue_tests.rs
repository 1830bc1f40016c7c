//! Queue contract tests
//!
//! Exercise the public [`FeedQueue`] surface through the in-memory
//! implementation.

#[cfg(test)]
mod tests {
    use crate::common;
    use feedflow::{FeedQueue, InMemoryQueue};
    use std::time::Duration;

    /// enqueue_many reports the queue length after each push
    #[tokio::test]
    async fn test_enqueue_reports_queue_length() {
        let queue = InMemoryQueue::new();

        assert_eq!(queue.enqueue_many(&common::make_records(3)).await.unwrap(), 3);
        assert_eq!(queue.enqueue_many(&common::make_records(4)).await.unwrap(), 7);
        assert_eq!(queue.pending().await.unwrap(), 7);
    }

    /// An empty slice is a no-op that returns zero without touching the queue
    #[tokio::test]
    async fn test_empty_enqueue_is_noop() {
        let queue = InMemoryQueue::new();
        assert_eq!(queue.enqueue_many(&[]).await.unwrap(), 0);

        queue.enqueue_many(&common::make_records(2)).await.unwrap();
        assert_eq!(queue.enqueue_many(&[]).await.unwrap(), 0);
        assert_eq!(queue.pending().await.unwrap(), 2);
    }

    /// dequeue_batch returns at most batch_size records, oldest first
    #[tokio::test]
    async fn test_dequeue_bounds_and_order() {
        let queue = InMemoryQueue::new();
        queue.enqueue_many(&common::make_records(7)).await.unwrap();

        let timeout = Duration::from_millis(50);
        let first = queue.dequeue_batch(5, timeout).await.unwrap();
        let ids: Vec<_> = first.iter().filter_map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec!["rec-0", "rec-1", "rec-2", "rec-3", "rec-4"]);

        let second = queue.dequeue_batch(5, timeout).await.unwrap();
        assert_eq!(second.len(), 2);

        // nothing left: the dequeue waits out its timeout and comes back empty
        let third = queue.dequeue_batch(5, timeout).await.unwrap();
        assert!(third.is_empty());
    }

    /// purge empties the queue; close latches and rejects later calls
    #[tokio::test]
    async fn test_purge_then_close() {
        let queue = InMemoryQueue::new();
        queue.enqueue_many(&common::make_records(6)).await.unwrap();

        queue.purge().await.unwrap();
        assert_eq!(queue.pending().await.unwrap(), 0);

        queue.close().await.unwrap();
        queue.close().await.unwrap();
        assert!(queue.pending().await.is_err());
        assert!(
            queue
                .dequeue_batch(1, Duration::from_millis(10))
                .await
                .is_err()
        );
    }
}
