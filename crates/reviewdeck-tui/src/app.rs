use std::sync::Arc;

use reviewdeck_core::feed::{FeedEvent, FeedHandle, FeedView};
use reviewdeck_core::review::NewReview;
use reviewdeck_core::AppConfig;

use crate::strip::StripLayout;
use crate::theme::Theme;

/// Field focused in the review form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Rating,
    Comment,
}

/// Guest review being written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitForm {
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub field: FormField,
}

impl Default for SubmitForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            rating: 5,
            comment: String::new(),
            field: FormField::Name,
        }
    }
}

impl SubmitForm {
    pub fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Name => FormField::Rating,
            FormField::Rating => FormField::Comment,
            FormField::Comment => FormField::Name,
        };
    }

    pub fn input_char(&mut self, c: char) {
        match self.field {
            FormField::Name => self.name.push(c),
            FormField::Comment => self.comment.push(c),
            FormField::Rating => {
                if let Some(digit) = c.to_digit(10) {
                    if (1..=5).contains(&digit) {
                        self.rating = digit as u8;
                    }
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        match self.field {
            FormField::Name => {
                self.name.pop();
            }
            FormField::Comment => {
                self.comment.pop();
            }
            FormField::Rating => {}
        }
    }

    pub fn adjust_rating(&mut self, up: bool) {
        self.rating = if up {
            (self.rating + 1).min(5)
        } else {
            self.rating.saturating_sub(1).max(1)
        };
    }

    pub fn to_new_review(&self) -> NewReview {
        NewReview {
            name: self.name.clone(),
            rating: self.rating,
            comment: self.comment.clone(),
        }
    }
}

/// Application mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Watching the feed
    Browse,
    /// Writing a review
    Submit(SubmitForm),
    /// Help overlay
    Help,
}

/// Application state
pub struct App {
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    /// Sender into the mounted feed
    pub feed: FeedHandle,
    /// Last snapshot published by the feed
    pub view: FeedView,
    pub layout: StripLayout,
    pub mode: Mode,
    /// Width of the review strip in columns, as last drawn
    pub strip_width: u16,
    /// A submission is on its way to the backend
    pub submitting: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(feed: FeedHandle, config: Arc<AppConfig>) -> Self {
        Self {
            layout: StripLayout::new(&config),
            config,
            theme: Theme::default(),
            feed,
            view: FeedView::default(),
            mode: Mode::Browse,
            strip_width: 0,
            submitting: false,
            should_quit: false,
        }
    }

    pub fn is_input_mode(&self) -> bool {
        matches!(self.mode, Mode::Submit(_))
    }

    /// Record the drawn strip width and tell the feed when it changed
    pub fn set_strip_width(&mut self, width: u16) {
        if width == self.strip_width {
            return;
        }
        self.strip_width = width;
        self.send(FeedEvent::ViewportResized {
            extent: self.layout.to_px(width),
        });
    }

    pub fn send(&self, event: FeedEvent) {
        if !self.feed.send(event) {
            tracing::warn!("Feed is no longer running");
        }
    }

    pub fn open_form(&mut self) {
        self.mode = Mode::Submit(SubmitForm::default());
    }

    pub fn form_mut(&mut self) -> Option<&mut SubmitForm> {
        match &mut self.mode {
            Mode::Submit(form) => Some(form),
            _ => None,
        }
    }

    pub fn exit_mode(&mut self) {
        self.mode = Mode::Browse;
    }
}
