//! A small in-process job scheduler built on tokio timers.
//!
//! Jobs are keyed; scheduling under an occupied key either keeps the
//! existing job or replaces it, per the job's coalescing rule. Constraints
//! are evaluated when the timer fires, not when the job is enqueued.

use fintrack_store::{NetworkMonitor, PowerMonitor};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The future a job task produces for one run.
pub type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Factory invoked each time a job fires. Repeating jobs call it once per
/// period, so it must be cheap to clone state into.
pub type JobTask = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// Wraps an async closure into the boxed form [`JobScheduler::schedule`]
/// takes.
pub fn job_task<F, Fut>(f: F) -> JobTask
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move || -> JobFuture { Box::pin(f()) })
}

/// Identity of a job slot. One job per key at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKey {
    /// The daily maintenance sync.
    Periodic,
    /// The sync triggered when the app returns to the foreground.
    Foreground,
    /// The debounced sync following a local mutation.
    PostOperation,
}

impl JobKey {
    fn as_str(self) -> &'static str {
        match self {
            JobKey::Periodic => "periodic",
            JobKey::Foreground => "foreground",
            JobKey::PostOperation => "post_operation",
        }
    }
}

/// What to do when a job is scheduled under a key that already holds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coalesce {
    /// Leave the existing job's timer running; the new request is dropped.
    KeepExisting,
    /// Abort the existing job and start the delay over.
    Replace,
}

/// Preconditions re-checked at fire time. An unmet constraint skips the
/// run; for repeating jobs the next period is still scheduled.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobConstraints {
    /// Require network reachability.
    pub require_network: bool,
    /// Require the battery not to be in a low-power condition.
    pub require_battery_not_low: bool,
}

/// Timing and coalescing parameters for one job.
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// Delay before the first (or only) run.
    pub delay: Duration,
    /// Interval between subsequent runs, if the job repeats.
    pub repeat: Option<Duration>,
    /// Preconditions checked when the timer fires.
    pub constraints: JobConstraints,
    /// Behavior when the key is already occupied.
    pub coalesce: Coalesce,
}

impl JobSpec {
    /// A one-shot job that replaces any pending job under the same key.
    pub fn once_after(delay: Duration) -> Self {
        Self {
            delay,
            repeat: None,
            constraints: JobConstraints::default(),
            coalesce: Coalesce::Replace,
        }
    }

    /// A repeating job firing every `interval`, keeping any existing job.
    pub fn every(interval: Duration) -> Self {
        Self {
            delay: interval,
            repeat: Some(interval),
            constraints: JobConstraints::default(),
            coalesce: Coalesce::KeepExisting,
        }
    }

    /// Sets the fire-time constraints.
    pub fn with_constraints(mut self, constraints: JobConstraints) -> Self {
        self.constraints = constraints;
        self
    }
}

/// Seam over the platform's background-job machinery.
///
/// Production targets would back this with the OS job scheduler; tests and
/// the default runtime use [`TokioJobScheduler`].
pub trait JobScheduler: Send + Sync {
    /// Schedules `task` under `key`, applying the spec's coalescing rule if
    /// the key is already occupied.
    fn schedule(&self, key: JobKey, spec: JobSpec, task: JobTask);

    /// Cancels the job under `key`, if any.
    fn cancel(&self, key: JobKey);

    /// Cancels every scheduled job.
    fn cancel_all(&self);

    /// Whether a live job occupies `key`.
    fn is_scheduled(&self, key: JobKey) -> bool;
}

/// [`JobScheduler`] backed by spawned tokio tasks and `tokio::time` sleeps.
pub struct TokioJobScheduler {
    network: Arc<dyn NetworkMonitor>,
    power: Arc<dyn PowerMonitor>,
    jobs: Mutex<HashMap<JobKey, JoinHandle<()>>>,
}

impl TokioJobScheduler {
    /// Creates a scheduler consulting the given monitors at fire time.
    pub fn new(network: Arc<dyn NetworkMonitor>, power: Arc<dyn PowerMonitor>) -> Self {
        Self {
            network,
            power,
            jobs: Mutex::new(HashMap::new()),
        }
    }
}

fn constraints_met(
    constraints: &JobConstraints,
    network: &dyn NetworkMonitor,
    power: &dyn PowerMonitor,
) -> bool {
    if constraints.require_network && !network.is_available() {
        return false;
    }
    if constraints.require_battery_not_low && power.is_battery_low() {
        return false;
    }
    true
}

impl JobScheduler for TokioJobScheduler {
    fn schedule(&self, key: JobKey, spec: JobSpec, task: JobTask) {
        let mut jobs = self.jobs.lock();
        if let Some(existing) = jobs.get(&key) {
            if !existing.is_finished() {
                match spec.coalesce {
                    Coalesce::KeepExisting => {
                        debug!(job = key.as_str(), "job already scheduled, keeping it");
                        return;
                    }
                    Coalesce::Replace => {
                        debug!(job = key.as_str(), "replacing scheduled job");
                        existing.abort();
                    }
                }
            }
        }
        let network = Arc::clone(&self.network);
        let power = Arc::clone(&self.power);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(spec.delay).await;
            loop {
                if constraints_met(&spec.constraints, network.as_ref(), power.as_ref()) {
                    task().await;
                } else {
                    info!(job = key.as_str(), "constraints unmet at fire time, skipping run");
                }
                match spec.repeat {
                    Some(interval) => tokio::time::sleep(interval).await,
                    None => break,
                }
            }
        });
        jobs.insert(key, handle);
    }

    fn cancel(&self, key: JobKey) {
        if let Some(handle) = self.jobs.lock().remove(&key) {
            handle.abort();
            debug!(job = key.as_str(), "cancelled job");
        }
    }

    fn cancel_all(&self) {
        for (key, handle) in self.jobs.lock().drain() {
            handle.abort();
            debug!(job = key.as_str(), "cancelled job");
        }
    }

    fn is_scheduled(&self, key: JobKey) -> bool {
        self.jobs
            .lock()
            .get(&key)
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}
