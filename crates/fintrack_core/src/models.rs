//! Domain payload models and the CBOR codec.
//!
//! These are the concrete shapes carried inside [`crate::SyncRecord`]
//! payloads. The sync engine never looks inside them.

use crate::error::{CoreError, CoreResult};
use crate::record::RecordId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Amount in minor currency units (cents). Negative for expenses.
    pub amount_minor: i64,
    /// Category this transaction is filed under, if any.
    pub category: Option<RecordId>,
    /// Free-form note.
    pub note: Option<String>,
    /// When the transaction occurred, milliseconds since the Unix epoch.
    pub occurred_at: i64,
}

/// A spending category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Display name.
    pub name: String,
    /// Optional icon identifier.
    pub icon: Option<String>,
}

/// The period a budget limit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetPeriod {
    /// Resets every week.
    Weekly,
    /// Resets every month.
    Monthly,
    /// Resets every year.
    Yearly,
}

/// A per-category spending limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Category the limit applies to.
    pub category: RecordId,
    /// Limit in minor currency units.
    pub limit_minor: i64,
    /// How often the budget resets.
    pub period: BudgetPeriod,
}

/// A template that spawns transactions on a fixed cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTransaction {
    /// The transaction to create on each occurrence.
    pub template: Transaction,
    /// Days between occurrences.
    pub cadence_days: u32,
    /// Next occurrence, milliseconds since the Unix epoch.
    pub next_at: i64,
}

/// Encodes a domain model to CBOR payload bytes.
pub fn encode_payload<T: Serialize>(value: &T) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CoreError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Decodes a domain model from CBOR payload bytes.
pub fn decode_payload<T: DeserializeOwned>(bytes: &[u8]) -> CoreResult<T> {
    ciborium::from_reader(bytes).map_err(|e| CoreError::Decode(e.to_string()))
}
