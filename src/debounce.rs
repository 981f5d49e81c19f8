//! Coalescing bursts of change notifications.
//!
//! [Debouncer] is a plain state machine driven by caller-supplied instants, so the refresh
//! logic it gates stays testable without timers. [crate::event::run_refresh_loop] drives it
//! from an async signal channel.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebouncePolicy {
    /// Quiet period after the last event before the trailing edge fires.
    pub delay: Duration,
    /// Fire on the first event of a burst as well.
    pub leading: bool,
}

impl Default for DebouncePolicy {
    fn default() -> Self {
        DebouncePolicy {
            delay: DEFAULT_DEBOUNCE_DELAY,
            leading: false,
        }
    }
}

impl DebouncePolicy {
    pub fn trailing(delay: Duration) -> Self {
        DebouncePolicy {
            delay,
            leading: false,
        }
    }

    pub fn leading(delay: Duration) -> Self {
        DebouncePolicy {
            delay,
            leading: true,
        }
    }
}

/// Trailing-edge debouncer with an optional leading edge.
///
/// A burst is a run of events each less than `delay` apart. With `leading` set, the first
/// event of a burst fires at once and the trailing edge only fires if more events followed.
#[derive(Debug, Clone)]
pub struct Debouncer {
    policy: DebouncePolicy,
    deadline: Option<Instant>,
    pending: bool,
}

impl Debouncer {
    pub fn new(policy: DebouncePolicy) -> Self {
        Debouncer {
            policy,
            deadline: None,
            pending: false,
        }
    }

    pub fn policy(&self) -> DebouncePolicy {
        self.policy
    }

    /// Record an event at `now`. Returns `true` if the caller should fire immediately.
    pub fn signal(&mut self, now: Instant) -> bool {
        let burst_start = self.deadline.is_none();
        self.deadline = Some(now + self.policy.delay);
        if burst_start && self.policy.leading {
            self.pending = false;
            return true;
        }
        self.pending = true;
        false
    }

    /// Returns `true` once the quiet period has elapsed with an unfired event outstanding.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                std::mem::take(&mut self.pending)
            }
            _ => false,
        }
    }

    /// Drop the timer. Returns `true` if an event was still waiting to fire.
    pub fn flush(&mut self) -> bool {
        self.deadline = None;
        std::mem::take(&mut self.pending)
    }

    /// When the current burst's trailing edge is due, if a burst is open.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_trailing_fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DebouncePolicy::trailing(DELAY));

        assert!(!debouncer.signal(t0));
        assert!(!debouncer.signal(t0 + ms(100)));
        assert!(!debouncer.signal(t0 + ms(200)));

        assert!(!debouncer.poll(t0 + ms(450)));
        assert!(debouncer.poll(t0 + ms(500)));
        assert!(!debouncer.poll(t0 + ms(900)));
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_leading_fires_first_event_only_once() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DebouncePolicy::leading(DELAY));

        assert!(debouncer.signal(t0));
        assert!(!debouncer.poll(t0 + ms(300)));

        // New burst: leading fires, and the follow-up event earns a trailing fire.
        assert!(debouncer.signal(t0 + ms(1000)));
        assert!(!debouncer.signal(t0 + ms(1100)));
        assert!(debouncer.poll(t0 + ms(1400)));
    }

    #[test]
    fn test_flush_reports_pending() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DebouncePolicy::default());
        assert!(!debouncer.flush());
        let _ = debouncer.signal(t0);
        assert!(debouncer.is_pending());
        assert!(debouncer.flush());
        assert!(!debouncer.is_pending());
    }
}
