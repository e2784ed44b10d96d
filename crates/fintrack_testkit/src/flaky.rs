//! A remote store with scripted failures for exercising retry paths.

use async_trait::async_trait;
use fintrack_core::{EntityKind, OwnerId, SyncRecord};
use fintrack_store::{MemoryRemoteStore, RemoteStore, StoreError, StoreResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Wraps a [`MemoryRemoteStore`] with scripted failures, call counters and
/// batch-size tracking.
///
/// Each scripted failure is consumed by one call; once the scripts are
/// drained, calls pass through to the inner store.
#[derive(Debug, Default)]
pub struct FlakyRemoteStore {
    inner: MemoryRemoteStore,
    write_failures: Mutex<VecDeque<StoreError>>,
    fetch_failures: Mutex<VecDeque<StoreError>>,
    write_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    largest_write_batch: AtomicUsize,
    write_delay: Mutex<Option<Duration>>,
}

impl FlakyRemoteStore {
    /// Creates a store with no scripted failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped store, for seeding and assertions.
    pub fn inner(&self) -> &MemoryRemoteStore {
        &self.inner
    }

    /// Queues `count` copies of `error` for upcoming `batch_write` calls.
    pub fn fail_next_writes(&self, error: StoreError, count: usize) {
        let mut failures = self.write_failures.lock();
        for _ in 0..count {
            failures.push_back(error.clone());
        }
    }

    /// Queues `count` copies of `error` for upcoming `fetch_updated_since`
    /// calls.
    pub fn fail_next_fetches(&self, error: StoreError, count: usize) {
        let mut failures = self.fetch_failures.lock();
        for _ in 0..count {
            failures.push_back(error.clone());
        }
    }

    /// Delays every write by `delay`; lets tests hold a pass in flight.
    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock() = Some(delay);
    }

    /// Number of `batch_write` calls seen.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_updated_since` calls seen.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// The largest batch any single write call received.
    pub fn largest_write_batch(&self) -> usize {
        self.largest_write_batch.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for FlakyRemoteStore {
    async fn fetch_updated_since(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        since: Option<i64>,
    ) -> StoreResult<Vec<SyncRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fetch_failures.lock().pop_front() {
            return Err(error);
        }
        self.inner.fetch_updated_since(owner, kind, since).await
    }

    async fn batch_write(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        records: &[SyncRecord],
    ) -> StoreResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.largest_write_batch
            .fetch_max(records.len(), Ordering::SeqCst);
        let delay = *self.write_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.write_failures.lock().pop_front() {
            return Err(error);
        }
        self.inner.batch_write(owner, kind, records).await
    }
}
