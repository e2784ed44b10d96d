//! # FinTrack Store
//!
//! Narrow interfaces to the sync subsystem's external collaborators:
//!
//! - [`LocalStore`]: the embedded, encrypted record store (per user, per
//!   entity kind CRUD plus a pending-upload query)
//! - [`RemoteStore`]: the cloud document store (fetch-since-timestamp and
//!   bounded batched writes)
//! - [`NetworkMonitor`]: observed connectivity, not just OS capability flags
//! - [`PowerMonitor`]: battery state for scheduler constraints
//! - [`WatermarkStore`]: the persisted per-user last-sync timestamp
//!
//! Each trait ships with an in-memory implementation used by tests and by
//! the engine's own unit tests. The real storage engine, encryption and
//! cloud document model live behind these seams and are out of scope here.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod local;
mod network;
mod power;
mod remote;
mod watermark;

pub use error::{StoreError, StoreResult};
pub use local::{LocalStore, MemoryLocalStore};
pub use network::{Connectivity, NetworkMonitor, StaticNetworkMonitor};
pub use power::{PowerMonitor, StaticPowerMonitor};
pub use remote::{MemoryRemoteStore, RemoteStore, REMOTE_WRITE_BATCH_LIMIT};
pub use watermark::{MemoryWatermarkStore, WatermarkStore};
