//! Dispatch pacing: a minimum interval between consecutive dispatches.

use std::time::Duration;
use tokio::time::{Instant, Sleep};

/// Enforces at least `interval` between two dispatches.
///
/// The first dispatch also waits one interval, measured from creation.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    next: Instant,
}

impl Pacer {
    /// Start pacing now
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now() + interval,
        }
    }

    /// Resolves once the next dispatch is allowed
    pub fn ready(&self) -> Sleep {
        tokio::time::sleep_until(self.next)
    }

    /// Record a dispatch happening now
    pub fn mark_dispatched(&mut self) {
        self.next = Instant::now() + self.interval;
    }

    /// Earliest instant of the next dispatch
    pub fn next_dispatch(&self) -> Instant {
        self.next
    }
}
