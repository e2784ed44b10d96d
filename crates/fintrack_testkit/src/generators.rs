//! Proptest strategies for sync records.

use crate::fixtures::transaction_record;
use fintrack_core::{encode_payload, SyncRecord, Transaction, UploadStatus};
use proptest::prelude::*;

/// A plausible millisecond timestamp.
pub fn arb_timestamp() -> impl Strategy<Value = i64> {
    1i64..2_000_000_000_000
}

/// A plausible transaction amount in minor units.
pub fn arb_amount() -> impl Strategy<Value = i64> {
    -1_000_000i64..1_000_000
}

/// A local/remote pair for the same record id with independent timestamps
/// and amounts.
#[derive(Debug, Clone)]
pub struct ConflictPair {
    /// The local copy, already synced so only conflict resolution touches it.
    pub local: SyncRecord,
    /// The remote copy fetched during the download phase.
    pub remote: SyncRecord,
}

/// Generates conflict pairs owned by `user`.
pub fn arb_conflict_pair(user: &'static str) -> impl Strategy<Value = ConflictPair> {
    (arb_timestamp(), arb_timestamp(), arb_amount(), arb_amount()).prop_map(
        move |(local_at, remote_at, local_amount, remote_amount)| {
            let local =
                transaction_record(user, local_amount, local_at).with_status(UploadStatus::Synced);
            let mut remote = local.clone();
            remote.updated_at = remote_at;
            remote.payload = encode_payload(&Transaction {
                amount_minor: remote_amount,
                category: None,
                note: None,
                occurred_at: remote_at,
            })
            .expect("transaction payload encodes");
            ConflictPair { local, remote }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn conflict_pairs_share_identity(pair in arb_conflict_pair("alice")) {
            prop_assert_eq!(pair.local.id, pair.remote.id);
            prop_assert_eq!(&pair.local.owner, &pair.remote.owner);
            prop_assert_eq!(pair.local.kind, pair.remote.kind);
        }
    }
}
