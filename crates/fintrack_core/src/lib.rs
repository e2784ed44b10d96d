//! # FinTrack Core
//!
//! Record model shared by the FinTrack sync subsystem.
//!
//! This crate provides:
//! - The [`SyncRecord`] envelope the engine reconciles (id, owner, kind,
//!   modification timestamp, opaque payload)
//! - The [`UploadStatus`] lifecycle for local records
//! - Domain payload models (transactions, categories, budgets, recurring
//!   transactions) with a CBOR codec
//! - [`SyncScope`], the explicit per-call authenticated-user context
//!
//! The engine treats payloads as opaque bytes; only `id`, `owner`,
//! `kind` and `updated_at` participate in reconciliation.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod models;
mod record;

pub use error::{CoreError, CoreResult};
pub use models::{
    decode_payload, encode_payload, Budget, BudgetPeriod, Category, RecurringTransaction,
    Transaction,
};
pub use record::{now_ms, EntityKind, OwnerId, RecordId, SyncRecord, SyncScope, UploadStatus};
