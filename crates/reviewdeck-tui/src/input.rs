use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{FormField, Mode};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Arrow controls: one page fraction of the viewport
    PageLeft,
    PageRight,
    /// One card at a time
    StepLeft,
    StepRight,
    Reload,
    DismissNotification,
    OpenForm,
    ShowHelp,
    // Form editing
    NextField,
    RatingUp,
    RatingDown,
    InputChar(char),
    Backspace,
    Submit,
    ExitMode,
    /// Any other key while browsing; pauses auto-advance
    Interact,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, mode: &Mode) -> Action {
    match mode {
        Mode::Submit(form) => handle_form_key(key, form.field),
        // Any key closes help
        Mode::Help => Action::ExitMode,
        Mode::Browse => handle_browse_key(key),
    }
}

fn handle_browse_key(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Left, _) | (KeyCode::Char('h'), KeyModifiers::NONE) => Action::PageLeft,
        (KeyCode::Right, _) | (KeyCode::Char('l'), KeyModifiers::NONE) => Action::PageRight,
        (KeyCode::Char('H'), _) => Action::StepLeft,
        (KeyCode::Char('L'), _) => Action::StepRight,

        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Reload,
        (KeyCode::Char('x'), KeyModifiers::NONE) | (KeyCode::Esc, _) => {
            Action::DismissNotification
        }
        (KeyCode::Char('w'), KeyModifiers::NONE) => Action::OpenForm,
        (KeyCode::Char('?'), _) => Action::ShowHelp,

        _ => Action::Interact,
    }
}

fn handle_form_key(key: KeyEvent, field: FormField) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => Action::ExitMode,
        (KeyCode::Enter, _) => Action::Submit,
        (KeyCode::Tab, _) => Action::NextField,
        (KeyCode::Backspace, _) => Action::Backspace,
        (KeyCode::Up, _) | (KeyCode::Right, _) if field == FormField::Rating => Action::RatingUp,
        (KeyCode::Down, _) | (KeyCode::Left, _) if field == FormField::Rating => {
            Action::RatingDown
        }
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::InputChar(c)
        }
        _ => Action::None,
    }
}
