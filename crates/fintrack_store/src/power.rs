//! Battery state reporting for scheduler constraints.

use std::sync::atomic::{AtomicBool, Ordering};

/// Reports whether the device battery is low.
pub trait PowerMonitor: Send + Sync {
    /// True when the battery is low enough that background work should be
    /// deferred.
    fn is_battery_low(&self) -> bool;
}

/// A monitor whose battery state is set by hand; used in tests and on
/// platforms without a battery.
#[derive(Debug, Default)]
pub struct StaticPowerMonitor {
    low: AtomicBool,
}

impl StaticPowerMonitor {
    /// Creates a monitor reporting a healthy battery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reported battery state.
    pub fn set_battery_low(&self, low: bool) {
        self.low.store(low, Ordering::SeqCst);
    }
}

impl PowerMonitor for StaticPowerMonitor {
    fn is_battery_low(&self) -> bool {
        self.low.load(Ordering::SeqCst)
    }
}
