//! The reconciliation engine.

use crate::config::EngineConfig;
use crate::error::{SyncError, SyncResult};
use crate::state::PassSummary;
use crate::state_store::SyncStateStore;
use async_trait::async_trait;
use fintrack_core::{now_ms, EntityKind, OwnerId, RecordId, SyncRecord, SyncScope, UploadStatus};
use fintrack_store::{LocalStore, NetworkMonitor, RemoteStore, WatermarkStore};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

type PassOutcome = SyncResult<PassSummary>;

/// Something that can run one full sync pass for a scope.
///
/// The scheduler depends on this seam rather than on the engine's concrete
/// type parameters.
#[async_trait]
pub trait SyncRunner: Send + Sync {
    /// Runs one upload-then-download pass over all entity kinds.
    async fn run_sync(&self, scope: &SyncScope) -> SyncResult<PassSummary>;
}

/// Orchestrates one reconciliation pass per invocation: upload pending
/// local changes, then download remote changes, applying last-write-wins.
///
/// At most one pass is in flight per scope; concurrent callers join the
/// in-flight pass's result instead of running a second cycle over the same
/// pending set.
pub struct SyncEngine<L, R, N, W>
where
    L: LocalStore,
    R: RemoteStore,
    N: NetworkMonitor,
    W: WatermarkStore,
{
    local: Arc<L>,
    remote: Arc<R>,
    network: Arc<N>,
    state: Arc<SyncStateStore<W>>,
    config: EngineConfig,
    in_flight: Mutex<HashMap<OwnerId, watch::Receiver<Option<PassOutcome>>>>,
}

/// Accumulates non-aborting batch failures across a pass.
#[derive(Default)]
struct FailureLog {
    first: Option<SyncError>,
    retries: u32,
}

impl FailureLog {
    fn record(&mut self, error: SyncError, retries: u32) {
        if self.first.is_none() {
            self.first = Some(error);
        }
        self.retries = self.retries.max(retries);
    }
}

/// Removes the in-flight marker even if the leader's task is dropped
/// mid-pass, so later callers do not join a pass that will never settle.
struct FlightGuard<'a> {
    owner: &'a OwnerId,
    in_flight: &'a Mutex<HashMap<OwnerId, watch::Receiver<Option<PassOutcome>>>>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(self.owner);
    }
}

impl<L, R, N, W> SyncEngine<L, R, N, W>
where
    L: LocalStore,
    R: RemoteStore,
    N: NetworkMonitor,
    W: WatermarkStore,
{
    /// Creates an engine over the given collaborators.
    pub fn new(
        local: Arc<L>,
        remote: Arc<R>,
        network: Arc<N>,
        state: Arc<SyncStateStore<W>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            local,
            remote,
            network,
            state,
            config,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// The state store this engine reports through.
    pub fn state_store(&self) -> &Arc<SyncStateStore<W>> {
        &self.state
    }

    /// Runs one pass over all entity kinds.
    pub async fn sync_all(&self, scope: &SyncScope) -> SyncResult<PassSummary> {
        self.single_flight(scope, &EntityKind::ALL, false).await
    }

    /// Runs one pass over all entity kinds, ignoring the watermark: the
    /// download phase fetches every remote record.
    pub async fn force_sync_all(&self, scope: &SyncScope) -> SyncResult<PassSummary> {
        self.single_flight(scope, &EntityKind::ALL, true).await
    }

    /// Runs one pass over a single entity kind.
    pub async fn sync_entity_kind(
        &self,
        scope: &SyncScope,
        kind: EntityKind,
    ) -> SyncResult<PassSummary> {
        self.single_flight(scope, &[kind], false).await
    }

    /// Serializes passes per scope. The first caller leads; concurrent
    /// callers for the same scope await the leader's published outcome.
    async fn single_flight(
        &self,
        scope: &SyncScope,
        kinds: &[EntityKind],
        force: bool,
    ) -> SyncResult<PassSummary> {
        enum Flight {
            Lead(watch::Sender<Option<PassOutcome>>),
            Join(watch::Receiver<Option<PassOutcome>>),
        }

        let flight = {
            let mut in_flight = self.in_flight.lock();
            if let Some(rx) = in_flight.get(scope.owner()) {
                Flight::Join(rx.clone())
            } else {
                let (tx, rx) = watch::channel(None);
                in_flight.insert(scope.owner().clone(), rx);
                Flight::Lead(tx)
            }
        };

        match flight {
            Flight::Join(mut rx) => {
                tracing::debug!(owner = %scope.owner(), "joining in-flight sync pass");
                loop {
                    let settled = rx.borrow_and_update().clone();
                    if let Some(outcome) = settled {
                        return outcome;
                    }
                    if rx.changed().await.is_err() {
                        return Err(SyncError::Cancelled);
                    }
                }
            }
            Flight::Lead(tx) => {
                let _guard = FlightGuard {
                    owner: scope.owner(),
                    in_flight: &self.in_flight,
                };
                let outcome = self.run_pass(scope, kinds, force).await;
                let _ = tx.send(Some(outcome.clone()));
                outcome
            }
        }
    }

    /// One full pass: upload then download per kind, then settle state and
    /// watermark.
    async fn run_pass(
        &self,
        scope: &SyncScope,
        kinds: &[EntityKind],
        force: bool,
    ) -> SyncResult<PassSummary> {
        let started_at = now_ms();
        let start = Instant::now();
        self.state.begin_pass();
        tracing::info!(owner = %scope.owner(), force, kinds = kinds.len(), "sync pass started");

        match self.run_phases(scope, kinds, force, started_at).await {
            Ok((mut summary, failures)) => {
                summary.duration = start.elapsed();
                match failures.first {
                    Some(error) => {
                        tracing::warn!(
                            owner = %scope.owner(),
                            retries = failures.retries,
                            %error,
                            "sync pass completed with failed batches"
                        );
                        self.state.fail_pass(&error, failures.retries);
                        Err(error)
                    }
                    None => match self.state.advance_watermark(scope.owner(), started_at).await {
                        Ok(()) => {
                            tracing::info!(
                                owner = %scope.owner(),
                                uploaded = summary.uploaded,
                                downloaded = summary.downloaded,
                                "sync pass succeeded"
                            );
                            self.state.complete_pass(started_at);
                            Ok(summary)
                        }
                        Err(error) => {
                            self.state.fail_pass(&error, 0);
                            Err(error)
                        }
                    },
                }
            }
            Err(error) => {
                tracing::warn!(owner = %scope.owner(), %error, "sync pass aborted");
                self.state.fail_pass(&error, 0);
                Err(error)
            }
        }
    }

    async fn run_phases(
        &self,
        scope: &SyncScope,
        kinds: &[EntityKind],
        force: bool,
        started_at: i64,
    ) -> SyncResult<(PassSummary, FailureLog)> {
        let mut summary = PassSummary::new(started_at);
        let mut failures = FailureLog::default();

        // Fail fast while offline: no remote calls, watermark untouched.
        self.ensure_online()?;

        for kind in kinds {
            self.upload_kind(scope, *kind, &mut summary, &mut failures)
                .await?;
            self.download_kind(scope, *kind, force, &mut summary, &mut failures)
                .await?;
        }

        Ok((summary, failures))
    }

    /// Upload phase for one kind: pending records go out in batches; each
    /// batch is confirmed before its records are marked synced.
    async fn upload_kind(
        &self,
        scope: &SyncScope,
        kind: EntityKind,
        summary: &mut PassSummary,
        failures: &mut FailureLog,
    ) -> SyncResult<()> {
        let owner = scope.owner();
        let pending = self.local.get_pending(owner, kind).await?;
        if pending.is_empty() {
            return Ok(());
        }
        tracing::debug!(owner = %owner, kind = %kind, pending = pending.len(), "upload phase");

        for chunk in pending.chunks(self.config.max_write_batch) {
            // Disconnection mid-pass abandons the batch: records stay
            // pending, never partially marked.
            self.ensure_online()?;

            let ids: Vec<RecordId> = chunk.iter().map(|r| r.id).collect();
            match self.batch_write_with_retry(owner, kind, chunk).await {
                Ok(()) => {
                    self.local
                        .mark_status(owner, kind, &ids, UploadStatus::Synced)
                        .await?;
                    summary.uploaded += chunk.len();
                }
                Err((SyncError::Offline, _)) => return Err(SyncError::Offline),
                Err((error, retries)) if error.is_transient() => {
                    // Retry budget exhausted: mark failed so the records are
                    // not silently retried forever, and keep going.
                    self.local
                        .mark_status(owner, kind, &ids, UploadStatus::Failed)
                        .await?;
                    summary.failed_uploads += chunk.len();
                    failures.record(error, retries);
                }
                Err((error @ SyncError::Validation(_), _)) => {
                    self.local
                        .mark_status(owner, kind, &ids, UploadStatus::Failed)
                        .await?;
                    summary.failed_uploads += chunk.len();
                    failures.record(error, 0);
                }
                Err((error, _)) => return Err(error),
            }
        }

        Ok(())
    }

    /// Download phase for one kind. Runs only after the upload phase has
    /// settled for that kind, so a stale remote snapshot cannot overwrite
    /// changes that were just uploaded.
    async fn download_kind(
        &self,
        scope: &SyncScope,
        kind: EntityKind,
        force: bool,
        summary: &mut PassSummary,
        failures: &mut FailureLog,
    ) -> SyncResult<()> {
        let owner = scope.owner();
        let since = if force {
            None
        } else {
            self.state.last_sync_timestamp(owner).await?
        };

        self.ensure_online()?;
        let remote_records = match self.fetch_with_retry(owner, kind, since).await {
            Ok(records) => records,
            Err((SyncError::Offline, _)) => return Err(SyncError::Offline),
            Err((error, retries)) if error.is_transient() => {
                failures.record(error, retries);
                return Ok(());
            }
            Err((error, _)) => return Err(error),
        };
        if remote_records.is_empty() {
            return Ok(());
        }
        tracing::debug!(owner = %owner, kind = %kind, fetched = remote_records.len(), "download phase");

        for remote_record in remote_records {
            self.resolve_conflict(owner, kind, remote_record, summary)
                .await?;
        }

        Ok(())
    }

    /// Whole-record last-write-wins. The local record is re-read at
    /// resolution time so a user edit landing mid-pass is never judged
    /// against a stale snapshot; ties keep the local copy.
    async fn resolve_conflict(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        remote_record: SyncRecord,
        summary: &mut PassSummary,
    ) -> SyncResult<()> {
        let local_record = self.local.get(owner, kind, &remote_record.id).await?;
        let remote_wins = match &local_record {
            None => true,
            Some(local) => remote_record.updated_at > local.updated_at,
        };

        if remote_wins {
            self.local
                .upsert(remote_record.with_status(UploadStatus::Synced))
                .await?;
            summary.downloaded += 1;
        } else {
            summary.local_kept += 1;
        }
        Ok(())
    }

    /// Writes one batch, retrying transient failures with capped
    /// exponential backoff. Returns the classified error and the number of
    /// attempts made when the budget is exhausted.
    async fn batch_write_with_retry(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        chunk: &[SyncRecord],
    ) -> Result<(), (SyncError, u32)> {
        let mut attempt = 0u32;
        loop {
            if !self.network.is_available() {
                return Err((SyncError::Offline, attempt));
            }
            match self.remote.batch_write(owner, kind, chunk).await {
                Ok(()) => return Ok(()),
                Err(store_error) => {
                    attempt += 1;
                    let error = SyncError::from(store_error);
                    if !error.is_transient() {
                        return Err((error, 0));
                    }
                    if attempt >= self.config.retry.max_attempts {
                        return Err((error, attempt));
                    }
                    let delay = self.config.retry.delay_for_attempt(attempt - 1);
                    tracing::debug!(
                        kind = %kind,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient batch failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Fetches remote changes with the same retry discipline as writes.
    async fn fetch_with_retry(
        &self,
        owner: &OwnerId,
        kind: EntityKind,
        since: Option<i64>,
    ) -> Result<Vec<SyncRecord>, (SyncError, u32)> {
        let mut attempt = 0u32;
        loop {
            if !self.network.is_available() {
                return Err((SyncError::Offline, attempt));
            }
            match self.remote.fetch_updated_since(owner, kind, since).await {
                Ok(records) => return Ok(records),
                Err(store_error) => {
                    attempt += 1;
                    let error = SyncError::from(store_error);
                    if !error.is_transient() {
                        return Err((error, 0));
                    }
                    if attempt >= self.config.retry.max_attempts {
                        return Err((error, attempt));
                    }
                    let delay = self.config.retry.delay_for_attempt(attempt - 1);
                    tracing::debug!(
                        kind = %kind,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient fetch failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn ensure_online(&self) -> SyncResult<()> {
        if self.network.is_available() {
            Ok(())
        } else {
            Err(SyncError::Offline)
        }
    }
}

#[async_trait]
impl<L, R, N, W> SyncRunner for SyncEngine<L, R, N, W>
where
    L: LocalStore,
    R: RemoteStore,
    N: NetworkMonitor,
    W: WatermarkStore,
{
    async fn run_sync(&self, scope: &SyncScope) -> SyncResult<PassSummary> {
        self.sync_all(scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_log_keeps_first_error_and_max_retries() {
        let mut log = FailureLog::default();
        log.record(SyncError::Transport("first".into()), 3);
        log.record(SyncError::Validation("second".into()), 0);

        assert_eq!(log.first, Some(SyncError::Transport("first".into())));
        assert_eq!(log.retries, 3);
    }
}
