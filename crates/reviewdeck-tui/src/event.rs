use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};

/// Event handler for terminal events
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Option<AppEvent>> {
        if !event::poll(self.tick_rate)? {
            return Ok(Some(AppEvent::Tick));
        }
        let event = match event::read()? {
            // Only presses; some terminals also report releases
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
            Event::Mouse(mouse) => mouse_event(mouse),
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            _ => None,
        };
        Ok(event)
    }
}

/// Wheel notches and left-button presses or drags; bare movement is ignored
fn mouse_event(mouse: MouseEvent) -> Option<AppEvent> {
    match mouse.kind {
        MouseEventKind::ScrollDown | MouseEventKind::ScrollRight => Some(AppEvent::Wheel(1)),
        MouseEventKind::ScrollUp | MouseEventKind::ScrollLeft => Some(AppEvent::Wheel(-1)),
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
            Some(AppEvent::Pointer {
                column: mouse.column,
                row: mouse.row,
            })
        }
        _ => None,
    }
}

/// Result of a review submission running in the background
#[derive(Debug)]
pub enum SubmitResult {
    Sent,
    Failed { error: String },
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Mouse wheel notch; positive scrolls right
    Wheel(i8),
    /// Left-button press or drag at a terminal cell
    Pointer { column: u16, row: u16 },
    /// Terminal was resized
    Resize(u16, u16),
    /// Redraw tick
    Tick,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 12,
            row: 3,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_bare_movement_is_not_interaction() {
        assert!(mouse_event(mouse(MouseEventKind::Moved)).is_none());
        assert!(mouse_event(mouse(MouseEventKind::Up(MouseButton::Left))).is_none());
        assert!(mouse_event(mouse(MouseEventKind::Down(MouseButton::Right))).is_none());
    }

    #[test]
    fn test_press_drag_and_wheel() {
        assert!(matches!(
            mouse_event(mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(AppEvent::Pointer { column: 12, row: 3 })
        ));
        assert!(matches!(
            mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left))),
            Some(AppEvent::Pointer { .. })
        ));
        assert!(matches!(
            mouse_event(mouse(MouseEventKind::ScrollLeft)),
            Some(AppEvent::Wheel(-1))
        ));
    }
}
