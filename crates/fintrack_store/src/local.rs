//! The embedded local record store interface.

use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use fintrack_core::{EntityKind, OwnerId, RecordId, SyncRecord, UploadStatus};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Per-user, per-kind CRUD over the embedded record store.
///
/// Non-sync write paths (user edits) go through the same store and must
/// mark edited records [`UploadStatus::Pending`] as a side effect of the
/// edit; the engine relies on `get_pending` seeing them on the next pass.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Fetches one record by id, or `None` if absent.
    async fn get(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        id: &RecordId,
    ) -> StoreResult<Option<SyncRecord>>;

    /// Fetches all records of `kind` waiting to be uploaded.
    async fn get_pending(&self, owner: &OwnerId, kind: EntityKind) -> StoreResult<Vec<SyncRecord>>;

    /// Inserts or replaces a record. The stored record's upload status is
    /// taken from the argument.
    async fn upsert(&self, record: SyncRecord) -> StoreResult<()>;

    /// Sets the upload status of the given records. Records that no longer
    /// exist are skipped.
    async fn mark_status(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        ids: &[RecordId],
        status: UploadStatus,
    ) -> StoreResult<()>;
}

type RecordKey = (OwnerId, EntityKind, RecordId);

/// An in-memory local store for tests and offline development.
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    records: RwLock<HashMap<RecordKey, SyncRecord>>,
    fail_reads: RwLock<Option<StoreError>>,
}

impl MemoryLocalStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent read fail with the given error.
    pub fn fail_reads_with(&self, error: StoreError) {
        *self.fail_reads.write() = Some(error);
    }

    /// Returns all records of `kind` for `owner`, regardless of status.
    pub fn all(&self, owner: &OwnerId, kind: EntityKind) -> Vec<SyncRecord> {
        self.records
            .read()
            .iter()
            .filter(|((o, k, _), _)| o == owner && *k == kind)
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Inserts a record synchronously; convenience for test setup.
    pub fn seed(&self, record: SyncRecord) {
        let key = (record.owner.clone(), record.kind, record.id);
        self.records.write().insert(key, record);
    }

    fn check_read_failure(&self) -> StoreResult<()> {
        match self.fail_reads.read().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        id: &RecordId,
    ) -> StoreResult<Option<SyncRecord>> {
        self.check_read_failure()?;
        let key = (owner.clone(), kind, *id);
        Ok(self.records.read().get(&key).cloned())
    }

    async fn get_pending(&self, owner: &OwnerId, kind: EntityKind) -> StoreResult<Vec<SyncRecord>> {
        self.check_read_failure()?;
        let mut pending: Vec<SyncRecord> = self
            .records
            .read()
            .iter()
            .filter(|((o, k, _), r)| o == owner && *k == kind && r.is_pending())
            .map(|(_, r)| r.clone())
            .collect();
        // Stable order keeps batch composition deterministic.
        pending.sort_by_key(|r| (r.updated_at, r.id));
        Ok(pending)
    }

    async fn upsert(&self, record: SyncRecord) -> StoreResult<()> {
        let key = (record.owner.clone(), record.kind, record.id);
        self.records.write().insert(key, record);
        Ok(())
    }

    async fn mark_status(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        ids: &[RecordId],
        status: UploadStatus,
    ) -> StoreResult<()> {
        let mut records = self.records.write();
        for id in ids {
            let key = (owner.clone(), kind, *id);
            if let Some(record) = records.get_mut(&key) {
                record.upload_status = status;
            }
        }
        Ok(())
    }
}
