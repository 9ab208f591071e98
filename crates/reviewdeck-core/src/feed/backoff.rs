use std::time::Duration;

use tokio::time::Instant;

use crate::config::RetryConfig;

/// Bounded exponential backoff for automatic page fetches
///
/// Failures open a window during which near-end triggers may not fetch:
/// base, 2x base, 4x base ... capped at `max`. After `max_failures`
/// consecutive failures automatic fetching stops until `reset`.
#[derive(Debug, Clone)]
pub struct RetryBackoff {
    base: Duration,
    max: Duration,
    max_failures: u32,
    failures: u32,
    not_before: Option<Instant>,
}

impl RetryBackoff {
    pub fn new(base: Duration, max: Duration, max_failures: u32) -> Self {
        Self {
            base,
            max,
            max_failures,
            failures: 0,
            not_before: None,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
            config.max_consecutive_failures,
        )
    }

    /// Delay after the given (1-based) consecutive failure
    pub fn delay_for(&self, failure: u32) -> Duration {
        let exponent = failure.saturating_sub(1).min(31);
        self.base
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max)
            .min(self.max)
    }

    /// Record a failure and return the window before the next automatic attempt
    pub fn record_failure(&mut self, now: Instant) -> Option<Duration> {
        self.failures = self.failures.saturating_add(1);
        if self.is_exhausted() {
            self.not_before = None;
            return None;
        }
        let delay = self.delay_for(self.failures);
        self.not_before = Some(now + delay);
        Some(delay)
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
        self.not_before = None;
    }

    /// Whether an automatic fetch may start at `now`
    pub fn allows(&self, now: Instant) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.not_before.map_or(true, |at| now >= at)
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_failures > 0 && self.failures >= self.max_failures
    }

    #[inline]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn reset(&mut self) {
        self.record_success();
    }
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
