//! Record fixtures with realistic finance payloads.

use fintrack_core::{
    decode_payload, encode_payload, Category, EntityKind, OwnerId, RecordId, SyncRecord,
    SyncScope, Transaction, UploadStatus,
};

/// An owner id for the given user name.
pub fn owner(name: &str) -> OwnerId {
    OwnerId::new(name)
}

/// A sync scope for the given user name.
pub fn scope(name: &str) -> SyncScope {
    SyncScope::for_user(owner(name))
}

/// A pending transaction record with the given amount and timestamp.
pub fn transaction_record(user: &str, amount_minor: i64, updated_at: i64) -> SyncRecord {
    let payload = encode_payload(&Transaction {
        amount_minor,
        category: None,
        note: None,
        occurred_at: updated_at,
    })
    .expect("transaction payload encodes");
    SyncRecord {
        id: RecordId::generate(),
        owner: owner(user),
        kind: EntityKind::Transaction,
        updated_at,
        payload,
        upload_status: UploadStatus::Pending,
    }
}

/// A pending category record with the given name and timestamp.
pub fn category_record(user: &str, name: &str, updated_at: i64) -> SyncRecord {
    let payload = encode_payload(&Category {
        name: name.to_string(),
        icon: None,
    })
    .expect("category payload encodes");
    SyncRecord {
        id: RecordId::generate(),
        owner: owner(user),
        kind: EntityKind::Category,
        updated_at,
        payload,
        upload_status: UploadStatus::Pending,
    }
}

/// The record with its upload status set to synced.
pub fn synced(record: SyncRecord) -> SyncRecord {
    record.with_status(UploadStatus::Synced)
}

/// Decodes the transaction amount out of a record's payload.
pub fn transaction_amount(record: &SyncRecord) -> i64 {
    decode_payload::<Transaction>(&record.payload)
        .expect("record carries a transaction payload")
        .amount_minor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_fixture_round_trips_amount() {
        let record = transaction_record("alice", -4200, 100);
        assert_eq!(transaction_amount(&record), -4200);
        assert!(record.is_pending());
        assert_eq!(record.updated_at, 100);
    }
}
