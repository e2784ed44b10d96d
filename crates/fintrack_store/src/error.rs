//! Error taxonomy shared by the collaborator interfaces.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the local store, remote store and watermark store.
///
/// The engine classifies these into transient failures (retried with
/// backoff) and fatal ones (surfaced immediately).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The remote store is unreachable (offline, connection refused).
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    /// A remote call timed out.
    #[error("remote call timed out: {0}")]
    Timeout(String),

    /// The calling scope is not authenticated.
    #[error("not authenticated: {0}")]
    Unauthenticated(String),

    /// The remote store rejected a record as malformed.
    #[error("record rejected: {0}")]
    InvalidRecord(String),

    /// The remote write quota is exhausted.
    #[error("write quota exceeded: {0}")]
    QuotaExceeded(String),

    /// A batched write exceeded the remote limit. Callers must chunk.
    #[error("batch of {len} records exceeds the limit of {max}")]
    BatchTooLarge {
        /// Records in the rejected batch.
        len: usize,
        /// The remote per-call limit.
        max: usize,
    },

    /// Local store failure (I/O, corruption).
    #[error("local store error: {0}")]
    Local(String),
}

impl StoreError {
    /// Returns true if the operation may succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(StoreError::Unavailable("offline".into()).is_transient());
        assert!(StoreError::Timeout("30s elapsed".into()).is_transient());
        assert!(!StoreError::Unauthenticated("no session".into()).is_transient());
        assert!(!StoreError::QuotaExceeded("daily limit".into()).is_transient());
        assert!(!StoreError::BatchTooLarge { len: 501, max: 500 }.is_transient());
    }
}
