//! Capped exponential backoff schedule.
//!
//! Used for the SSM send-command/get-command-invocation polling RPC, where
//! fixed sleeps waste most of the per-call timeout on slow registrations.
//! Readiness polling does NOT use this — it keeps the target's fixed
//! interval so attempt counts stay predictable.

use std::time::Duration;

/// Infinite iterator of sleep durations: `initial`, doubling each step,
/// clamped at `cap`. Callers bound it with `.take(n)` or an outer deadline.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    cap: Duration,
}

impl Backoff {
    #[must_use]
    pub fn new(initial: Duration, cap: Duration) -> Self {
        Self {
            next: initial.min(cap),
            cap,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        self.next = self.next.saturating_mul(2).min(self.cap);
        Some(current)
    }
}
