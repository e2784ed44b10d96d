//! The syncable record envelope and its identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Returns the current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Stable unique identifier for a record. Assigned at creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of the user owning a record. All queries and writes are
/// scoped by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    /// Creates an owner id from a user identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The authenticated user on whose behalf a sync runs.
///
/// Threaded explicitly into every engine and scheduler call; there is no
/// ambient current-user context anywhere in the subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncScope {
    owner: OwnerId,
}

impl SyncScope {
    /// Creates a scope for the given authenticated user.
    pub fn for_user(owner: OwnerId) -> Self {
        Self { owner }
    }

    /// The owning user.
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }
}

/// The entity types the sync subsystem reconciles, one remote collection
/// per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A single ledger entry.
    Transaction,
    /// A spending category.
    Category,
    /// A per-category spending limit.
    Budget,
    /// A template that spawns transactions on a cadence.
    RecurringTransaction,
}

impl EntityKind {
    /// All entity kinds, in the order a full pass visits them.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Transaction,
        EntityKind::Category,
        EntityKind::Budget,
        EntityKind::RecurringTransaction,
    ];

    /// The remote collection name for this kind.
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Transaction => "transactions",
            EntityKind::Category => "categories",
            EntityKind::Budget => "budgets",
            EntityKind::RecurringTransaction => "recurring_transactions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

/// Local-only upload lifecycle of a record. Never persisted remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UploadStatus {
    /// The last known pass wrote this record (or a newer version) remotely.
    Synced,
    /// Modified since the last confirmed remote write.
    #[default]
    Pending,
    /// Upload exhausted its retry budget; waiting for a manual or
    /// scheduled retry to mark it pending again.
    Failed,
}

/// The record envelope the engine reconciles.
///
/// The payload is opaque CBOR of one of the domain models in this crate;
/// reconciliation only reads `id`, `owner`, `kind` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Stable unique identifier.
    pub id: RecordId,
    /// Owning user.
    pub owner: OwnerId,
    /// Which collection this record belongs to.
    pub kind: EntityKind,
    /// Modification timestamp in milliseconds since the Unix epoch, set by
    /// whichever side last wrote the record.
    pub updated_at: i64,
    /// Opaque CBOR payload of the domain model.
    pub payload: Vec<u8>,
    /// Local upload lifecycle. Skipped on the wire.
    #[serde(skip)]
    pub upload_status: UploadStatus,
}

impl SyncRecord {
    /// Creates a new record owned by `owner`, stamped with the current time
    /// and marked pending upload.
    pub fn new(owner: OwnerId, kind: EntityKind, payload: Vec<u8>) -> Self {
        Self {
            id: RecordId::generate(),
            owner,
            kind,
            updated_at: now_ms(),
            payload,
            upload_status: UploadStatus::Pending,
        }
    }

    /// Applies a local edit: replaces the payload, bumps the modification
    /// timestamp and marks the record pending upload.
    pub fn apply_edit(&mut self, payload: Vec<u8>) {
        self.payload = payload;
        self.updated_at = now_ms();
        self.upload_status = UploadStatus::Pending;
    }

    /// Returns true if the record is waiting to be uploaded.
    pub fn is_pending(&self) -> bool {
        self.upload_status == UploadStatus::Pending
    }

    /// Returns a copy with the given upload status.
    pub fn with_status(mut self, status: UploadStatus) -> Self {
        self.upload_status = status;
        self
    }
}
