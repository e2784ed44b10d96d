//! The cloud document store interface.

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use fintrack_core::{EntityKind, OwnerId, RecordId, SyncRecord};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Maximum number of records the cloud store accepts in one batched write.
pub const REMOTE_WRITE_BATCH_LIMIT: usize = 500;

/// Per-user, per-kind access to the cloud document store: one collection
/// per entity kind, scoped to the owning user by the store's security rules.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetches records with `updated_at` strictly greater than `since`.
    /// `None` fetches the whole collection.
    async fn fetch_updated_since(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        since: Option<i64>,
    ) -> StoreResult<Vec<SyncRecord>>;

    /// Writes up to [`REMOTE_WRITE_BATCH_LIMIT`] records atomically.
    ///
    /// Either the whole batch is committed or none of it is; callers must
    /// not treat a failed batch as partially applied.
    async fn batch_write(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        records: &[SyncRecord],
    ) -> StoreResult<()>;
}

type RecordKey = (OwnerId, EntityKind, RecordId);

/// An in-memory remote store for tests.
///
/// Enforces the batch limit and per-user scoping the way the real cloud
/// store's security rules would. Upload status is local bookkeeping and is
/// not meaningful on records stored here.
#[derive(Debug, Default)]
pub struct MemoryRemoteStore {
    records: RwLock<HashMap<RecordKey, SyncRecord>>,
}

impl MemoryRemoteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record server-side; convenience for test setup.
    pub fn seed(&self, record: SyncRecord) {
        let key = (record.owner.clone(), record.kind, record.id);
        self.records.write().insert(key, record);
    }

    /// Returns one record by id, if present.
    pub fn get(&self, owner: &OwnerId, kind: EntityKind, id: &RecordId) -> Option<SyncRecord> {
        self.records
            .read()
            .get(&(owner.clone(), kind, *id))
            .cloned()
    }

    /// Number of records stored for `owner` and `kind`.
    pub fn len(&self, owner: &OwnerId, kind: EntityKind) -> usize {
        self.records
            .read()
            .keys()
            .filter(|(o, k, _)| o == owner && *k == kind)
            .count()
    }

    /// Returns true if no records are stored for `owner` and `kind`.
    pub fn is_empty(&self, owner: &OwnerId, kind: EntityKind) -> bool {
        self.len(owner, kind) == 0
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch_updated_since(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        since: Option<i64>,
    ) -> StoreResult<Vec<SyncRecord>> {
        let floor = since.unwrap_or(i64::MIN);
        let mut records: Vec<SyncRecord> = self
            .records
            .read()
            .iter()
            .filter(|((o, k, _), r)| o == owner && *k == kind && r.updated_at > floor)
            .map(|(_, r)| r.clone())
            .collect();
        records.sort_by_key(|r| (r.updated_at, r.id));
        Ok(records)
    }

    async fn batch_write(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        records: &[SyncRecord],
    ) -> StoreResult<()> {
        if records.len() > REMOTE_WRITE_BATCH_LIMIT {
            return Err(StoreError::BatchTooLarge {
                len: records.len(),
                max: REMOTE_WRITE_BATCH_LIMIT,
            });
        }
        for record in records {
            if &record.owner != owner || record.kind != kind {
                return Err(StoreError::InvalidRecord(format!(
                    "record {} does not belong to {}/{}",
                    record.id,
                    owner,
                    kind.collection_name()
                )));
            }
        }
        let mut stored = self.records.write();
        for record in records {
            let key = (record.owner.clone(), record.kind, record.id);
            stored.insert(key, record.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fintrack_core::UploadStatus;

    fn record(owner: &str, updated_at: i64) -> SyncRecord {
        SyncRecord {
            id: RecordId::generate(),
            owner: OwnerId::new(owner),
            kind: EntityKind::Transaction,
            updated_at,
            payload: vec![0x02],
            upload_status: UploadStatus::Pending,
        }
    }

    #[tokio::test]
    async fn fetch_since_is_strictly_greater() {
        let store = MemoryRemoteStore::new();
        let owner = OwnerId::new("alice");
        store.seed(record("alice", 100));
        store.seed(record("alice", 200));

        let fetched = store
            .fetch_updated_since(&owner, EntityKind::Transaction, Some(100))
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].updated_at, 200);

        let all = store
            .fetch_updated_since(&owner, EntityKind::Transaction, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn batch_write_rejects_oversized_batches() {
        let store = MemoryRemoteStore::new();
        let owner = OwnerId::new("alice");
        let batch: Vec<SyncRecord> = (0..REMOTE_WRITE_BATCH_LIMIT + 1)
            .map(|i| record("alice", i as i64))
            .collect();

        let result = store
            .batch_write(&owner, EntityKind::Transaction, &batch)
            .await;
        assert!(matches!(result, Err(StoreError::BatchTooLarge { .. })));
        assert!(store.is_empty(&owner, EntityKind::Transaction));
    }

    #[tokio::test]
    async fn batch_write_enforces_owner_scoping() {
        let store = MemoryRemoteStore::new();
        let owner = OwnerId::new("alice");
        let foreign = record("bob", 100);

        let result = store
            .batch_write(&owner, EntityKind::Transaction, &[foreign])
            .await;
        assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
    }
}
