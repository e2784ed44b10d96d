//! Error types and transient/fatal classification.

use fintrack_store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Classified errors surfaced by a sync pass.
///
/// Transient errors are retried internally with backoff before being
/// surfaced; fatal errors short-circuit the pass immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The network is unavailable. Transient; the pass fails fast without
    /// touching the remote store.
    #[error("network unavailable")]
    Offline,

    /// The remote store could not be reached or timed out. Transient.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The scope is not authenticated. Fatal.
    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    /// The remote store rejected malformed data. Fatal, but does not block
    /// unrelated batches or entity kinds.
    #[error("remote store rejected data: {0}")]
    Validation(String),

    /// The remote write quota is exhausted. Fatal for this pass.
    #[error("write quota exceeded: {0}")]
    Quota(String),

    /// The embedded local store failed. Fatal.
    #[error("local store failure: {0}")]
    LocalStore(String),

    /// The pass was cancelled before completing.
    #[error("sync cancelled")]
    Cancelled,
}

impl SyncError {
    /// Returns true if the next pass may succeed without intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Offline | SyncError::Transport(_))
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(m) | StoreError::Timeout(m) => SyncError::Transport(m),
            StoreError::Unauthenticated(m) => SyncError::Unauthenticated(m),
            StoreError::InvalidRecord(m) => SyncError::Validation(m),
            StoreError::BatchTooLarge { len, max } => {
                SyncError::Validation(format!("batch of {len} exceeds limit of {max}"))
            }
            StoreError::QuotaExceeded(m) => SyncError::Quota(m),
            StoreError::Local(m) => SyncError::LocalStore(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(SyncError::Offline.is_transient());
        assert!(SyncError::Transport("connection refused".into()).is_transient());
        assert!(!SyncError::Unauthenticated("expired session".into()).is_transient());
        assert!(!SyncError::Validation("bad field".into()).is_transient());
        assert!(!SyncError::Quota("daily cap".into()).is_transient());
        assert!(!SyncError::Cancelled.is_transient());
    }

    #[test]
    fn store_errors_map_to_classified_errors() {
        assert!(matches!(
            SyncError::from(StoreError::Timeout("30s".into())),
            SyncError::Transport(_)
        ));
        assert!(matches!(
            SyncError::from(StoreError::BatchTooLarge { len: 501, max: 500 }),
            SyncError::Validation(_)
        ));
        assert!(matches!(
            SyncError::from(StoreError::QuotaExceeded("cap".into())),
            SyncError::Quota(_)
        ));
    }
}
