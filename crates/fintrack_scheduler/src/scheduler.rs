//! The sync trigger policies.

use crate::job::{job_task, JobConstraints, JobKey, JobScheduler, JobSpec, JobTask};
use fintrack_core::SyncScope;
use fintrack_sync_engine::SyncRunner;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Interval of the maintenance sync pass.
pub const PERIODIC_SYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Delay before the pass triggered by the app coming to the foreground.
pub const FOREGROUND_SYNC_DELAY: Duration = Duration::from_secs(5);

/// Debounce window after a local mutation before its pass runs.
pub const POST_OPERATION_SYNC_DELAY: Duration = Duration::from_secs(30);

/// Maps application events to sync passes.
///
/// Each trigger owns one job slot, so a burst of local edits collapses into
/// a single pass thirty seconds after the last edit, and repeated
/// foreground activations restart the five-second delay instead of queuing
/// passes.
pub struct SyncScheduler {
    runner: Arc<dyn SyncRunner>,
    jobs: Arc<dyn JobScheduler>,
    scope: SyncScope,
}

impl SyncScheduler {
    /// Creates a scheduler driving `runner` for `scope`.
    pub fn new(runner: Arc<dyn SyncRunner>, jobs: Arc<dyn JobScheduler>, scope: SyncScope) -> Self {
        Self { runner, jobs, scope }
    }

    /// Registers the daily maintenance pass. Idempotent: if the periodic
    /// job is already registered its timer is left untouched.
    ///
    /// The pass only runs with network available and the battery not low.
    pub fn schedule_periodic_sync(&self) {
        let spec = JobSpec::every(PERIODIC_SYNC_INTERVAL).with_constraints(JobConstraints {
            require_network: true,
            require_battery_not_low: true,
        });
        self.jobs.schedule(JobKey::Periodic, spec, self.sync_task());
    }

    /// Schedules a pass five seconds from now, replacing any pending
    /// foreground pass.
    pub fn schedule_foreground_sync(&self) {
        let spec = JobSpec::once_after(FOREGROUND_SYNC_DELAY).with_constraints(JobConstraints {
            require_network: true,
            ..JobConstraints::default()
        });
        self.jobs.schedule(JobKey::Foreground, spec, self.sync_task());
    }

    /// Schedules a pass thirty seconds from now, replacing any pending
    /// post-operation pass. Call after every local mutation; only the last
    /// call in a burst produces a pass.
    pub fn schedule_post_operation_sync(&self) {
        let spec = JobSpec::once_after(POST_OPERATION_SYNC_DELAY).with_constraints(
            JobConstraints {
                require_network: true,
                ..JobConstraints::default()
            },
        );
        self.jobs
            .schedule(JobKey::PostOperation, spec, self.sync_task());
    }

    /// Unregisters the periodic pass.
    pub fn cancel_periodic_sync(&self) {
        self.jobs.cancel(JobKey::Periodic);
    }

    /// Cancels every pending pass; used on sign-out.
    pub fn cancel_all_sync(&self) {
        self.jobs.cancel_all();
    }

    /// Whether the periodic pass is registered.
    pub fn is_periodic_sync_scheduled(&self) -> bool {
        self.jobs.is_scheduled(JobKey::Periodic)
    }

    fn sync_task(&self) -> JobTask {
        let runner = Arc::clone(&self.runner);
        let scope = self.scope.clone();
        job_task(move || {
            let runner = Arc::clone(&runner);
            let scope = scope.clone();
            async move {
                match runner.run_sync(&scope).await {
                    Ok(summary) => debug!(
                        uploaded = summary.uploaded,
                        downloaded = summary.downloaded,
                        "scheduled sync pass finished"
                    ),
                    Err(error) => warn!(%error, "scheduled sync pass failed"),
                }
            }
        })
    }
}
