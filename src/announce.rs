//! Screen-reader style live region: one short message at a time, cleared
//! after a fixed delay.

use std::time::{Duration, Instant};

use tracing::info;

/// Default time a message stays visible.
pub const DEFAULT_ANNOUNCEMENT_TTL: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct Announcer {
    message: Option<String>,
    clear_at: Option<Instant>,
    ttl: Duration,
}

impl Default for Announcer {
    fn default() -> Self {
        Self::new(DEFAULT_ANNOUNCEMENT_TTL)
    }
}

impl Announcer {
    pub fn new(ttl: Duration) -> Self {
        Self {
            message: None,
            clear_at: None,
            ttl,
        }
    }

    /// Replace the current message and restart the clear timer.
    pub fn announce(&mut self, message: impl Into<String>, now: Instant) {
        let message = message.into();
        info!(target: "stager::announce", "{}", message);
        self.message = Some(message);
        self.clear_at = Some(now + self.ttl);
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Clear the message once its timer is due.
    pub fn tick(&mut self, now: Instant) {
        if self.clear_at.is_some_and(|at| now >= at) {
            self.message = None;
            self.clear_at = None;
        }
    }

    /// Drop the message and its timer (teardown).
    pub fn cancel(&mut self) {
        self.message = None;
        self.clear_at = None;
    }
}
