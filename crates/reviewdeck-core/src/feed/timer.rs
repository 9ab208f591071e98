//! Cancel-and-reschedule timer handles.
//!
//! A `TimerSlot` only remembers a deadline. The session loop sleeps until the
//! earliest armed slot and then asks the controller which slots are due, so
//! every timer expiry is folded into the same event sequence as user input and
//! fetch completions.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSlot {
    deadline: Option<Instant>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `after` from `now`, replacing any pending deadline
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Disarm and return true if the deadline has been reached
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

/// Earliest of several optional deadlines
pub fn earliest<I>(deadlines: I) -> Option<Instant>
where
    I: IntoIterator<Item = Option<Instant>>,
{
    deadlines.into_iter().flatten().min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_replaces_deadline() {
        let t0 = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(t0, Duration::from_millis(3000));
        slot.arm(t0 + Duration::from_millis(1000), Duration::from_millis(3000));
        assert_eq!(slot.deadline(), Some(t0 + Duration::from_millis(4000)));
        assert!(!slot.is_due(t0 + Duration::from_millis(3999)));
        assert!(slot.is_due(t0 + Duration::from_millis(4000)));
    }

    #[test]
    fn test_take_if_due_disarms() {
        let t0 = Instant::now();
        let mut slot = TimerSlot::new();
        slot.arm(t0, Duration::from_millis(10));
        assert!(!slot.take_if_due(t0));
        assert!(slot.take_if_due(t0 + Duration::from_millis(10)));
        assert!(!slot.is_armed());
        assert!(!slot.take_if_due(t0 + Duration::from_millis(20)));
    }

    #[test]
    fn test_earliest_skips_unarmed() {
        let t0 = Instant::now();
        let later = t0 + Duration::from_secs(2);
        let sooner = t0 + Duration::from_secs(1);
        assert_eq!(earliest([None, Some(later), Some(sooner)]), Some(sooner));
        assert_eq!(earliest([None, None]), None);
    }
}
