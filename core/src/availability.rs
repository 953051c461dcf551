//! Durable-store availability tracking.
//!
//! The monitor starts available (or unavailable, when no durable backend
//! could be connected) and moves to unavailable on the first durable fault.
//! There is no way back: a new monitor, i.e. a process restart, is required
//! to use the durable backend again.

use std::sync::atomic::{AtomicBool, Ordering};

/// One-way availability flag for the durable backend.
///
/// Shared between the orchestrator and observers (health endpoint) via `Arc`.
#[derive(Debug)]
pub struct AvailabilityMonitor {
    available: AtomicBool,
}

impl AvailabilityMonitor {
    /// Create a monitor in the given state.
    #[must_use]
    pub const fn new(available: bool) -> Self {
        Self {
            available: AtomicBool::new(available),
        }
    }

    /// Monitor for a connected durable backend.
    #[must_use]
    pub const fn available() -> Self {
        Self::new(true)
    }

    /// Monitor for a process that never reached its durable backend.
    #[must_use]
    pub const fn unavailable() -> Self {
        Self::new(false)
    }

    /// Whether the durable backend may still be used.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Stop using the durable backend.
    ///
    /// Idempotent. Returns `true` only for the call that performed the transition.
    pub fn mark_unavailable(&self) -> bool {
        self.available.swap(false, Ordering::AcqRel)
    }
}

impl Default for AvailabilityMonitor {
    fn default() -> Self {
        Self::available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_available_by_default() {
        assert!(AvailabilityMonitor::default().is_available());
    }

    #[test]
    fn mark_unavailable_is_one_way_and_idempotent() {
        let monitor = AvailabilityMonitor::available();

        assert!(monitor.mark_unavailable());
        assert!(!monitor.is_available());

        assert!(!monitor.mark_unavailable());
        assert!(!monitor.is_available());
    }

    #[test]
    fn unavailable_monitor_never_transitions() {
        let monitor = AvailabilityMonitor::unavailable();
        assert!(!monitor.mark_unavailable());
        assert!(!monitor.is_available());
    }
}
