//! Persistence for the per-user last-sync timestamp.

use crate::error::StoreResult;
use async_trait::async_trait;
use fintrack_core::OwnerId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Persists the single last-sync timestamp scalar per user: the high-water
/// mark below which all remote changes are assumed already applied locally.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Loads the watermark for `owner`, or `None` if no pass ever completed.
    async fn last_sync_timestamp(&self, owner: &OwnerId) -> StoreResult<Option<i64>>;

    /// Stores the watermark for `owner`.
    async fn set_last_sync_timestamp(&self, owner: &OwnerId, timestamp: i64) -> StoreResult<()>;
}

/// An in-memory watermark store for tests.
#[derive(Debug, Default)]
pub struct MemoryWatermarkStore {
    watermarks: RwLock<HashMap<OwnerId, i64>>,
}

impl MemoryWatermarkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatermarkStore for MemoryWatermarkStore {
    async fn last_sync_timestamp(&self, owner: &OwnerId) -> StoreResult<Option<i64>> {
        Ok(self.watermarks.read().get(owner).copied())
    }

    async fn set_last_sync_timestamp(&self, owner: &OwnerId, timestamp: i64) -> StoreResult<()> {
        self.watermarks.write().insert(owner.clone(), timestamp);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn watermark_round_trips_per_owner() {
        let store = MemoryWatermarkStore::new();
        let alice = OwnerId::new("alice");
        let bob = OwnerId::new("bob");

        assert_eq!(store.last_sync_timestamp(&alice).await.unwrap(), None);

        store.set_last_sync_timestamp(&alice, 1_000).await.unwrap();
        assert_eq!(
            store.last_sync_timestamp(&alice).await.unwrap(),
            Some(1_000)
        );
        assert_eq!(store.last_sync_timestamp(&bob).await.unwrap(), None);
    }
}
