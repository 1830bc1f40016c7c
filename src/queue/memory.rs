//! Process-local queue for tests and benchmarking
//!
//! Mirrors the Redis client's blocking-pop semantics over a plain VecDeque,
//! so pipeline behavior can be exercised without a running store.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

use super::FeedQueue;
use crate::core::record::Record;
use crate::utils::error::{FeedError, Result};

/// In-memory FIFO queue of records
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    items: Mutex<VecDeque<Record>>,
    notify: Notify,
    closed: AtomicBool,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(FeedError::lifecycle("queue client is closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl FeedQueue for InMemoryQueue {
    async fn enqueue_many(&self, records: &[Record]) -> Result<usize> {
        self.ensure_open()?;
        if records.is_empty() {
            return Ok(0);
        }

        let len = {
            let mut items = self.items.lock();
            items.extend(records.iter().cloned());
            items.len()
        };
        self.notify.notify_one();
        Ok(len)
    }

    async fn dequeue_batch(&self, batch_size: usize, timeout: Duration) -> Result<Vec<Record>> {
        self.ensure_open()?;
        if batch_size == 0 {
            return Ok(Vec::new());
        }

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            // Register interest before checking so a push between the check
            // and the await still wakes this waiter.
            let notified = self.notify.notified();

            {
                let mut items = self.items.lock();
                if !items.is_empty() {
                    let take = batch_size.min(items.len());
                    let batch: Vec<Record> = items.drain(..take).collect();
                    if !items.is_empty() {
                        // Chain the wakeup so other waiters see the leftovers.
                        self.notify.notify_one();
                    }
                    return Ok(batch);
                }
            }

            if self.closed.load(Ordering::Acquire) {
                return Ok(Vec::new());
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(Vec::new());
            }
        }
    }

    async fn pending(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.items.lock().len())
    }

    async fn purge(&self) -> Result<()> {
        self.ensure_open()?;
        self.items.lock().clear();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        // Wake any parked dequeuers; they drain leftovers or return empty.
        self.notify.notify_waiters();
        Ok(())
    }
}
