use std::time::Duration;

use tokio::time::Instant;

use super::scheduler::AutoAdvanceScheduler;
use super::scroll::{PositionChanged, ScrollCause};
use super::timer::TimerSlot;

/// Decides when a human is driving the feed
///
/// Every interaction suppresses the scheduler and restarts the quiescence
/// timer; auto-advance only resumes once the timer runs out undisturbed.
#[derive(Debug, Clone)]
pub struct InteractionArbiter {
    quiescence: Duration,
    timer: TimerSlot,
    last_interaction_at: Option<Instant>,
}

impl InteractionArbiter {
    pub fn new(quiescence: Duration) -> Self {
        Self {
            quiescence,
            timer: TimerSlot::new(),
            last_interaction_at: None,
        }
    }

    pub fn on_user_interaction(&mut self, now: Instant, scheduler: &mut AutoAdvanceScheduler) {
        self.last_interaction_at = Some(now);
        scheduler.suppress();
        self.timer.arm(now, self.quiescence);
    }

    /// Only user-caused movement counts as interaction
    pub fn on_position_changed(
        &mut self,
        change: &PositionChanged,
        now: Instant,
        scheduler: &mut AutoAdvanceScheduler,
    ) {
        if change.cause == ScrollCause::User {
            self.on_user_interaction(now, scheduler);
        }
    }

    /// Resume auto-advance if the quiescence window has elapsed.
    /// Returns true when the window closed.
    pub fn on_quiescence_elapsed(&mut self, now: Instant, scheduler: &mut AutoAdvanceScheduler) -> bool {
        if !self.timer.take_if_due(now) {
            return false;
        }
        scheduler.resume(now);
        true
    }

    /// Whether someone interacted within the current quiescence window
    #[inline]
    pub fn is_interacting(&self) -> bool {
        self.timer.is_armed()
    }

    #[inline]
    pub fn last_interaction_at(&self) -> Option<Instant> {
        self.last_interaction_at
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub(crate) fn is_due(&self, now: Instant) -> bool {
        self.timer.is_due(now)
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::scheduler::SchedulerState;
    use crate::feed::scroll::ScrollPosition;

    const Q: Duration = Duration::from_millis(3000);

    fn running_scheduler(now: Instant) -> AutoAdvanceScheduler {
        let mut sched = AutoAdvanceScheduler::new(Duration::from_millis(3000), 0.4, 10.0);
        sched.start(now, false);
        sched
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_scenario_resume_exactly_after_quiescence() {
        let t0 = Instant::now();
        let mut sched = running_scheduler(t0);
        let mut arbiter = InteractionArbiter::new(Q);

        arbiter.on_user_interaction(t0, &mut sched);
        assert_eq!(sched.state(), SchedulerState::Suppressed);
        assert_eq!(arbiter.last_interaction_at(), Some(t0));

        assert!(!arbiter.on_quiescence_elapsed(t0 + ms(2999), &mut sched));
        assert_eq!(sched.state(), SchedulerState::Suppressed);

        assert!(arbiter.on_quiescence_elapsed(t0 + ms(3000), &mut sched));
        assert_eq!(sched.state(), SchedulerState::Running);
        assert_eq!(sched.tick_deadline(), Some(t0 + ms(6000)));
    }

    #[test]
    fn test_repeated_interaction_debounces() {
        let t0 = Instant::now();
        let mut sched = running_scheduler(t0);
        let mut arbiter = InteractionArbiter::new(Q);

        arbiter.on_user_interaction(t0, &mut sched);
        arbiter.on_user_interaction(t0 + ms(2000), &mut sched);

        assert!(!arbiter.on_quiescence_elapsed(t0 + ms(3000), &mut sched));
        assert_eq!(sched.state(), SchedulerState::Suppressed);
        assert!(arbiter.on_quiescence_elapsed(t0 + ms(5000), &mut sched));
        assert_eq!(sched.state(), SchedulerState::Running);
    }

    #[test]
    fn test_auto_advance_movement_is_not_interaction() {
        let t0 = Instant::now();
        let mut sched = running_scheduler(t0);
        let mut arbiter = InteractionArbiter::new(Q);
        let change = PositionChanged {
            position: ScrollPosition::default(),
            previous_offset: 400.0,
            cause: ScrollCause::AutoAdvance,
        };

        arbiter.on_position_changed(&change, t0, &mut sched);
        assert_eq!(sched.state(), SchedulerState::Running);
        assert!(!arbiter.is_interacting());

        let user = PositionChanged { cause: ScrollCause::User, ..change };
        arbiter.on_position_changed(&user, t0, &mut sched);
        assert_eq!(sched.state(), SchedulerState::Suppressed);
    }
}
