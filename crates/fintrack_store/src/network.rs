//! Connectivity reporting.

use tokio::sync::watch;

/// Observed connectivity, after active reachability verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// The network is reachable.
    Connected,
    /// The network is unreachable.
    Disconnected,
}

/// Reports observed connectivity.
///
/// Implementations are expected to verify actual reachability rather than
/// relay OS capability flags; a captive portal counts as disconnected.
pub trait NetworkMonitor: Send + Sync {
    /// Synchronous snapshot of the current connectivity.
    fn is_available(&self) -> bool;

    /// Subscribes to connectivity transitions.
    fn observe(&self) -> watch::Receiver<Connectivity>;
}

/// A monitor whose connectivity is set by hand; used in tests and as a
/// stand-in where the platform provides no reachability signal.
#[derive(Debug)]
pub struct StaticNetworkMonitor {
    tx: watch::Sender<Connectivity>,
}

impl StaticNetworkMonitor {
    /// Creates a monitor with the given initial connectivity.
    pub fn new(available: bool) -> Self {
        let state = if available {
            Connectivity::Connected
        } else {
            Connectivity::Disconnected
        };
        let (tx, _) = watch::channel(state);
        Self { tx }
    }

    /// Creates a connected monitor.
    pub fn connected() -> Self {
        Self::new(true)
    }

    /// Creates a disconnected monitor.
    pub fn disconnected() -> Self {
        Self::new(false)
    }

    /// Flips the reported connectivity, notifying observers.
    pub fn set_available(&self, available: bool) {
        let state = if available {
            Connectivity::Connected
        } else {
            Connectivity::Disconnected
        };
        // send_replace never fails; the sender keeps the channel alive.
        self.tx.send_replace(state);
    }
}

impl NetworkMonitor for StaticNetworkMonitor {
    fn is_available(&self) -> bool {
        *self.tx.borrow() == Connectivity::Connected
    }

    fn observe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn snapshot_tracks_set_available() {
        let monitor = StaticNetworkMonitor::connected();
        assert!(monitor.is_available());

        monitor.set_available(false);
        assert!(!monitor.is_available());
    }

    #[tokio::test]
    async fn observers_see_transitions() {
        let monitor = StaticNetworkMonitor::connected();
        let mut rx = monitor.observe();

        monitor.set_available(false);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Connectivity::Disconnected);
    }
}
