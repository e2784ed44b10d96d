//! # FinTrack Scheduler
//!
//! Decides *when* the sync engine runs. Three trigger policies, each with
//! its own coalescing discipline:
//!
//! | Trigger | Delay | Constraints | Coalescing |
//! |---|---|---|---|
//! | Periodic | every 24 h | network, battery not low | keep existing |
//! | Foreground | 5 s after app activation | network | replace |
//! | Post-operation | 30 s after a local write | network | replace |
//!
//! Rapid successive edits collapse into a single pass 30 seconds after the
//! last edit. Constraints are re-checked at fire time; an unmet
//! precondition skips the engine invocation entirely (the engine still
//! fails fast on its own connectivity check).
//!
//! The platform job machinery sits behind the [`JobScheduler`] seam so the
//! concrete implementation (OS job scheduler, timers, persisted queue) is
//! swappable; [`TokioJobScheduler`] is the timer-based one.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod job;
mod scheduler;

pub use job::{
    job_task, Coalesce, JobConstraints, JobFuture, JobKey, JobScheduler, JobSpec, JobTask,
    TokioJobScheduler,
};
pub use scheduler::{
    SyncScheduler, FOREGROUND_SYNC_DELAY, PERIODIC_SYNC_INTERVAL, POST_OPERATION_SYNC_DELAY,
};
