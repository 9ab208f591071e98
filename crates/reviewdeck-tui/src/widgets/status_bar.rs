use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use reviewdeck_core::feed::SchedulerState;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let view = &app.view;

        let mode_str = match view.scheduler {
            SchedulerState::Running => "AUTO",
            SchedulerState::Suppressed => "PAUSED",
            SchedulerState::Idle => "IDLE",
        };

        let mut status_text = format!(" {} | Reviews: {}", mode_str, view.items.len());
        if view.loading {
            status_text.push_str(" | loading…");
        } else if !view.has_more && !view.items.is_empty() {
            status_text.push_str(" | all loaded");
        }
        if view.failures > 0 {
            status_text.push_str(&format!(" | failed x{}", view.failures));
        }

        let help_hint = " q:quit ←/→:scroll r:reload w:write ?:help ";
        let padding_len = (area.width as usize)
            .saturating_sub(status_text.width() + help_hint.width());

        let line = Line::from(vec![
            Span::styled(
                status_text,
                Style::default().fg(theme.fg0).bg(theme.bg2),
            ),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(
                help_hint,
                Style::default().fg(theme.grey2).bg(theme.bg2),
            ),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}
