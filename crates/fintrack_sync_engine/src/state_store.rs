//! The single source of truth for sync status and the persisted watermark.

use crate::error::{SyncError, SyncResult};
use crate::state::SyncState;
use fintrack_core::OwnerId;
use fintrack_store::WatermarkStore;
use tokio::sync::watch;

/// Holds the current [`SyncState`] and the persisted last-sync timestamp
/// per user.
///
/// All mutation is funneled through the engine; the UI and scheduler only
/// observe. The state resets to `Idle` when a new pass begins or when a
/// consumer acknowledges a terminal state via [`reset_to_idle`].
///
/// [`reset_to_idle`]: SyncStateStore::reset_to_idle
pub struct SyncStateStore<W: WatermarkStore> {
    state_tx: watch::Sender<SyncState>,
    watermarks: W,
}

impl<W: WatermarkStore> SyncStateStore<W> {
    /// Creates a store in the `Idle` state backed by the given watermark
    /// persistence.
    pub fn new(watermarks: W) -> Self {
        let (state_tx, _) = watch::channel(SyncState::Idle);
        Self {
            state_tx,
            watermarks,
        }
    }

    /// Subscribes to state transitions.
    pub fn observe(&self) -> watch::Receiver<SyncState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> SyncState {
        self.state_tx.borrow().clone()
    }

    /// Acknowledges a terminal state, returning to `Idle`. No-op while a
    /// pass is running.
    pub fn reset_to_idle(&self) {
        self.state_tx.send_if_modified(|state| {
            if state.is_terminal() {
                *state = SyncState::Idle;
                true
            } else {
                false
            }
        });
    }

    /// The watermark for `owner`, or `None` if no pass ever completed.
    pub async fn last_sync_timestamp(&self, owner: &OwnerId) -> SyncResult<Option<i64>> {
        self.watermarks
            .last_sync_timestamp(owner)
            .await
            .map_err(SyncError::from)
    }

    pub(crate) fn begin_pass(&self) {
        self.state_tx.send_replace(SyncState::Syncing);
    }

    pub(crate) fn complete_pass(&self, timestamp: i64) {
        self.state_tx.send_replace(SyncState::Success { timestamp });
    }

    pub(crate) fn fail_pass(&self, error: &SyncError, retries: u32) {
        self.state_tx.send_replace(SyncState::Error {
            message: error.to_string(),
            retries,
        });
    }

    pub(crate) async fn advance_watermark(&self, owner: &OwnerId, timestamp: i64) -> SyncResult<()> {
        self.watermarks
            .set_last_sync_timestamp(owner, timestamp)
            .await
            .map_err(SyncError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fintrack_store::MemoryWatermarkStore;

    fn store() -> SyncStateStore<MemoryWatermarkStore> {
        SyncStateStore::new(MemoryWatermarkStore::new())
    }

    #[tokio::test]
    async fn initial_state_is_idle() {
        assert_eq!(store().current(), SyncState::Idle);
    }

    #[tokio::test]
    async fn observers_see_the_full_cycle() {
        let store = store();
        let mut rx = store.observe();

        store.begin_pass();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_syncing());

        store.complete_pass(42);
        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow_and_update(),
            SyncState::Success { timestamp: 42 }
        );

        store.reset_to_idle();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SyncState::Idle);
    }

    #[tokio::test]
    async fn reset_is_ignored_while_syncing() {
        let store = store();
        store.begin_pass();
        store.reset_to_idle();
        assert!(store.current().is_syncing());
    }

    #[tokio::test]
    async fn failure_carries_message_and_retries() {
        let store = store();
        store.begin_pass();
        store.fail_pass(&SyncError::Transport("connection refused".into()), 3);

        match store.current() {
            SyncState::Error { message, retries } => {
                assert!(message.contains("connection refused"));
                assert_eq!(retries, 3);
            }
            other => panic!("expected error state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn watermark_round_trips() {
        let store = store();
        let owner = OwnerId::new("alice");
        assert_eq!(store.last_sync_timestamp(&owner).await.unwrap(), None);

        store.advance_watermark(&owner, 1_234).await.unwrap();
        assert_eq!(
            store.last_sync_timestamp(&owner).await.unwrap(),
            Some(1_234)
        );
    }
}
