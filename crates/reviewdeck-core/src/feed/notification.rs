use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use super::timer::TimerSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub shown_at: Instant,
}

/// Single-slot toast with auto-dismiss; a new message replaces the old one
#[derive(Debug, Clone)]
pub struct NotificationSink {
    current: Option<Notification>,
    timer: TimerSlot,
    display: Duration,
}

impl NotificationSink {
    pub fn new(display: Duration) -> Self {
        Self {
            current: None,
            timer: TimerSlot::new(),
            display,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind, now: Instant) {
        let message = message.into();
        tracing::debug!(%kind, "Notification: {}", message);
        self.current = Some(Notification {
            message,
            kind,
            shown_at: now,
        });
        self.timer.arm(now, self.display);
    }

    /// Manual close
    pub fn dismiss(&mut self) {
        self.current = None;
        self.timer.cancel();
    }

    /// Clear the slot if its display time has run out
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.timer.take_if_due(now) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub(crate) fn is_due(&self, now: Instant) -> bool {
        self.timer.is_due(now)
    }
}
