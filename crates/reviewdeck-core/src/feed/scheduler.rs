use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use super::scroll::{PositionChanged, ScrollCause, ScrollController};
use super::timer::TimerSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Not started yet, or torn down
    #[default]
    Idle,
    /// Advancing the viewport on every tick
    Running,
    /// Paused while someone interacts with the feed
    Suppressed,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Running => "running",
            SchedulerState::Suppressed => "paused",
        };
        f.write_str(name)
    }
}

/// Timer-driven auto-advance of the review strip
///
/// `Idle -> Running` on the first loaded page, `Running <-> Suppressed` as the
/// interaction arbiter decides, and back to `Idle` for good on teardown. The
/// tick timer is only armed while `Running`.
#[derive(Debug, Clone)]
pub struct AutoAdvanceScheduler {
    state: SchedulerState,
    interval: Duration,
    step_fraction: f64,
    wrap_epsilon: f64,
    tick: TimerSlot,
    disposed: bool,
}

impl AutoAdvanceScheduler {
    pub fn new(interval: Duration, step_fraction: f64, wrap_epsilon: f64) -> Self {
        Self {
            state: SchedulerState::Idle,
            interval,
            step_fraction,
            wrap_epsilon,
            tick: TimerSlot::new(),
            disposed: false,
        }
    }

    #[inline]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn tick_deadline(&self) -> Option<Instant> {
        self.tick.deadline()
    }

    pub(crate) fn tick_is_due(&self, now: Instant) -> bool {
        self.tick.is_due(now)
    }

    /// Leave `Idle`. Starts suppressed when an interaction is already in progress.
    pub fn start(&mut self, now: Instant, suppressed: bool) {
        if self.disposed || self.state != SchedulerState::Idle {
            return;
        }
        if suppressed {
            self.state = SchedulerState::Suppressed;
            tracing::debug!("Auto-advance ready, waiting for interaction to end");
        } else {
            self.state = SchedulerState::Running;
            self.tick.arm(now, self.interval);
            tracing::debug!("Auto-advance started");
        }
    }

    /// Pause and cancel the pending tick. No effect before the first start.
    pub fn suppress(&mut self) {
        if self.state == SchedulerState::Running {
            tracing::debug!("Auto-advance suppressed");
        }
        if self.state != SchedulerState::Idle {
            self.state = SchedulerState::Suppressed;
        }
        self.tick.cancel();
    }

    /// Back to `Running` with a fresh tick interval
    pub fn resume(&mut self, now: Instant) {
        if self.state != SchedulerState::Suppressed {
            return;
        }
        self.state = SchedulerState::Running;
        self.tick.arm(now, self.interval);
        tracing::debug!("Auto-advance resumed");
    }

    /// One auto-advance step: wrap to the start at the end, otherwise move
    /// forward by a fraction of the viewport. A no-op unless `Running`.
    pub fn on_tick(&mut self, now: Instant, scroll: &mut ScrollController) -> Option<PositionChanged> {
        if self.state != SchedulerState::Running {
            self.tick.cancel();
            return None;
        }
        self.tick.arm(now, self.interval);

        if scroll.at_end(self.wrap_epsilon) {
            scroll.scroll_to_start(ScrollCause::AutoAdvance)
        } else {
            let step = scroll.position().viewport_extent * self.step_fraction;
            scroll.advance_by(step, ScrollCause::AutoAdvance)
        }
    }

    /// Terminal transition; cancels the tick timer
    pub fn dispose(&mut self) {
        self.state = SchedulerState::Idle;
        self.disposed = true;
        self.tick.cancel();
    }
}
