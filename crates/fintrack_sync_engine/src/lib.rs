//! # FinTrack Sync Engine
//!
//! Reconciles the embedded local store with the cloud store, one pass at a
//! time.
//!
//! This crate provides:
//! - [`SyncEngine`]: upload-then-download reconciliation with whole-record
//!   last-write-wins conflict resolution
//! - Per-batch retry with capped exponential backoff, transient/fatal error
//!   classification
//! - [`SyncStateStore`]: the observable sync state and the persisted
//!   per-user watermark
//! - Single-flight execution: concurrent callers for the same scope join
//!   one in-flight pass
//!
//! ## Pass ordering
//!
//! Within a pass, every entity kind uploads its pending records before the
//! download phase runs for that kind. A download that ran first could fetch
//! a stale remote snapshot and overwrite changes the upload was about to
//! confirm.
//!
//! ## Key invariants
//!
//! - A record is `Synced` iff the last known pass confirmed it (or a newer
//!   version) remotely
//! - A batch is never partially marked: all of it or none of it
//! - The watermark advances only after a fully successful pass
//! - No mutation ever leaves the calling scope's records

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod state;
mod state_store;

pub use config::{EngineConfig, RetryConfig};
pub use engine::{SyncEngine, SyncRunner};
pub use error::{SyncError, SyncResult};
pub use state::{PassSummary, SyncState};
pub use state_store::SyncStateStore;
