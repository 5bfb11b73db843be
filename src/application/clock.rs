// Clock abstraction and cancellable timer slots
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A named one-shot timer slot.
///
/// Re-arming replaces the previous deadline instead of extending it, so a
/// slot never has more than one pending firing.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    name: &'static str,
    deadline: Option<Instant>,
}

impl ScheduledTask {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            deadline: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn reset(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarms the slot and returns true if its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
