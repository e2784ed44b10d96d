//! Trigger-policy tests with paused tokio time.
//!
//! A counting stub stands in for the sync engine so the tests observe
//! exactly how many passes each trigger policy produces.

use async_trait::async_trait;
use fintrack_core::{now_ms, OwnerId, SyncScope};
use fintrack_scheduler::{
    SyncScheduler, TokioJobScheduler, FOREGROUND_SYNC_DELAY, PERIODIC_SYNC_INTERVAL,
    POST_OPERATION_SYNC_DELAY,
};
use fintrack_store::{StaticNetworkMonitor, StaticPowerMonitor};
use fintrack_sync_engine::{PassSummary, SyncResult, SyncRunner};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct CountingRunner {
    runs: AtomicUsize,
}

impl CountingRunner {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            runs: AtomicUsize::new(0),
        })
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SyncRunner for CountingRunner {
    async fn run_sync(&self, _scope: &SyncScope) -> SyncResult<PassSummary> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(PassSummary::new(now_ms()))
    }
}

struct Harness {
    runner: Arc<CountingRunner>,
    network: Arc<StaticNetworkMonitor>,
    power: Arc<StaticPowerMonitor>,
    scheduler: SyncScheduler,
}

fn harness() -> Harness {
    let runner = CountingRunner::new();
    let network = Arc::new(StaticNetworkMonitor::connected());
    let power = Arc::new(StaticPowerMonitor::new());
    let jobs = Arc::new(TokioJobScheduler::new(
        Arc::clone(&network) as _,
        Arc::clone(&power) as _,
    ));
    let scheduler = SyncScheduler::new(
        Arc::clone(&runner) as _,
        jobs,
        SyncScope::for_user(OwnerId::new("alice")),
    );
    Harness {
        runner,
        network,
        power,
        scheduler,
    }
}

#[tokio::test(start_paused = true)]
async fn rapid_local_edits_collapse_into_one_pass() {
    let h = harness();
    for _ in 0..4 {
        h.scheduler.schedule_post_operation_sync();
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    h.scheduler.schedule_post_operation_sync();
    assert_eq!(h.runner.runs(), 0);

    tokio::time::sleep(POST_OPERATION_SYNC_DELAY + Duration::from_secs(1)).await;
    assert_eq!(h.runner.runs(), 1);

    // No further passes once the one-shot has fired.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(h.runner.runs(), 1);
}

#[tokio::test(start_paused = true)]
async fn foreground_reschedule_restarts_the_delay() {
    let h = harness();
    h.scheduler.schedule_foreground_sync();
    tokio::time::sleep(Duration::from_secs(3)).await;

    // Second activation before the first fires replaces it.
    h.scheduler.schedule_foreground_sync();
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(h.runner.runs(), 0);

    tokio::time::sleep(FOREGROUND_SYNC_DELAY).await;
    assert_eq!(h.runner.runs(), 1);
}

#[tokio::test(start_paused = true)]
async fn periodic_registration_is_idempotent() {
    let h = harness();
    h.scheduler.schedule_periodic_sync();
    assert!(h.scheduler.is_periodic_sync_scheduled());

    tokio::time::sleep(Duration::from_secs(3600)).await;
    // Re-registering must not reset the 24 h timer.
    h.scheduler.schedule_periodic_sync();

    tokio::time::sleep(PERIODIC_SYNC_INTERVAL - Duration::from_secs(3599)).await;
    assert_eq!(h.runner.runs(), 1);
    assert!(h.scheduler.is_periodic_sync_scheduled());
}

#[tokio::test(start_paused = true)]
async fn periodic_pass_repeats_daily() {
    let h = harness();
    h.scheduler.schedule_periodic_sync();

    tokio::time::sleep(PERIODIC_SYNC_INTERVAL * 3 + Duration::from_secs(1)).await;
    assert_eq!(h.runner.runs(), 3);
}

#[tokio::test(start_paused = true)]
async fn offline_at_fire_time_skips_the_pass() {
    let h = harness();
    h.network.set_available(false);
    h.scheduler.schedule_post_operation_sync();

    tokio::time::sleep(POST_OPERATION_SYNC_DELAY + Duration::from_secs(1)).await;
    assert_eq!(h.runner.runs(), 0);

    // Back online, a fresh trigger runs normally.
    h.network.set_available(true);
    h.scheduler.schedule_post_operation_sync();
    tokio::time::sleep(POST_OPERATION_SYNC_DELAY + Duration::from_secs(1)).await;
    assert_eq!(h.runner.runs(), 1);
}

#[tokio::test(start_paused = true)]
async fn low_battery_defers_the_periodic_pass_only() {
    let h = harness();
    h.power.set_battery_low(true);
    h.scheduler.schedule_periodic_sync();
    h.scheduler.schedule_foreground_sync();

    tokio::time::sleep(PERIODIC_SYNC_INTERVAL + Duration::from_secs(1)).await;
    // The foreground pass ran; the periodic one was skipped.
    assert_eq!(h.runner.runs(), 1);

    h.power.set_battery_low(false);
    tokio::time::sleep(PERIODIC_SYNC_INTERVAL).await;
    assert_eq!(h.runner.runs(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancel_all_drops_every_pending_pass() {
    let h = harness();
    h.scheduler.schedule_periodic_sync();
    h.scheduler.schedule_foreground_sync();
    h.scheduler.schedule_post_operation_sync();

    h.scheduler.cancel_all_sync();
    assert!(!h.scheduler.is_periodic_sync_scheduled());

    tokio::time::sleep(PERIODIC_SYNC_INTERVAL * 2).await;
    assert_eq!(h.runner.runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn cancelling_the_periodic_pass_leaves_one_shots_alone() {
    let h = harness();
    h.scheduler.schedule_periodic_sync();
    h.scheduler.schedule_post_operation_sync();

    h.scheduler.cancel_periodic_sync();
    assert!(!h.scheduler.is_periodic_sync_scheduled());

    tokio::time::sleep(POST_OPERATION_SYNC_DELAY + Duration::from_secs(1)).await;
    assert_eq!(h.runner.runs(), 1);
}
