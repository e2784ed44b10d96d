//! # FinTrack Testkit
//!
//! Shared test tooling for the sync subsystem:
//! - Record fixtures with realistic finance payloads
//! - Proptest generators for conflict pairs
//! - [`FlakyRemoteStore`]: a remote store with scripted failures, call
//!   counting and batch-size tracking
//!
//! Everything here is test-only; nothing in this crate reaches production
//! code paths.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod fixtures;
mod flaky;
mod generators;

pub use fixtures::{
    category_record, owner, scope, transaction_amount, transaction_record, synced,
};
pub use flaky::FlakyRemoteStore;
pub use generators::{arb_amount, arb_conflict_pair, arb_timestamp, ConflictPair};
