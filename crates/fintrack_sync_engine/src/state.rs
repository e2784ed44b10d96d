//! Sync state machine and pass summaries.

use std::time::Duration;

/// Process-wide sync status, observed by the UI and the scheduler.
///
/// Lifecycle: `Idle → Syncing → Success → Idle` on the happy path,
/// `Syncing → Error → Idle` on failure. Only the engine transitions it;
/// consumers match exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// No pass is running and no result is waiting to be acknowledged.
    Idle,
    /// A pass is in flight.
    Syncing,
    /// The last pass completed; `timestamp` is the new watermark.
    Success {
        /// Pass start time, milliseconds since the Unix epoch; equals the
        /// advanced watermark.
        timestamp: i64,
    },
    /// The last pass failed.
    Error {
        /// Classified error message for display.
        message: String,
        /// Retries performed before surfacing (0 for fatal errors).
        retries: u32,
    },
}

impl SyncState {
    /// Returns true if a pass is currently running.
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncState::Syncing)
    }

    /// Returns true for the terminal states of a cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncState::Success { .. } | SyncState::Error { .. })
    }
}

/// Counters describing one completed pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PassSummary {
    /// Pass start time, milliseconds since the Unix epoch.
    pub started_at: i64,
    /// Records confirmed written to the remote store.
    pub uploaded: usize,
    /// Remote records inserted or applied locally.
    pub downloaded: usize,
    /// Remote records discarded because the local copy won the conflict.
    pub local_kept: usize,
    /// Records marked failed after exhausting their retry budget.
    pub failed_uploads: usize,
    /// Wall-clock duration of the pass.
    pub duration: Duration,
}

impl PassSummary {
    /// Creates an empty summary for a pass starting at `started_at`.
    pub fn new(started_at: i64) -> Self {
        Self {
            started_at,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_predicates() {
        assert!(SyncState::Syncing.is_syncing());
        assert!(!SyncState::Idle.is_syncing());
        assert!(SyncState::Success { timestamp: 1 }.is_terminal());
        assert!(SyncState::Error {
            message: "offline".into(),
            retries: 0
        }
        .is_terminal());
        assert!(!SyncState::Idle.is_terminal());
    }
}
