//! Graceful reload of the shell frame
//!
//! The frame is first asked to reload itself. If it does not acknowledge
//! within the delay, the host reloads it by force. The timer is polled by the
//! host's event loop; nothing here sleeps.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct GracefulReload {
    delay: Duration,
    deadline: Option<Instant>,
}

impl GracefulReload {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Schedule the forced reload, replacing any pending one
    pub fn request(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// The frame acknowledged; returns whether a fallback was pending
    pub fn acknowledge(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Returns true exactly once when the deadline has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
