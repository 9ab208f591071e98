use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use reviewdeck_core::feed::NotificationKind;

use crate::app::App;

/// Transient notification in the bottom right corner
pub struct ToastWidget;

impl ToastWidget {
    /// `area` is the feed area; the toast sits just above its bottom edge
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let Some(notification) = &app.view.notification else {
            return;
        };
        let theme = &app.theme;
        let color = theme.notification(notification.kind);

        let width = (notification.message.width() as u16 + 4)
            .max(20)
            .min(area.width.saturating_sub(2));
        let height = 3u16.min(area.height);
        if width == 0 || height == 0 {
            return;
        }
        let toast_area = Rect::new(
            area.right().saturating_sub(width + 1),
            area.bottom().saturating_sub(height),
            width,
            height,
        );

        let title = match notification.kind {
            NotificationKind::Success => " Done ",
            NotificationKind::Error => " Error ",
            NotificationKind::Info => " Note ",
        };

        frame.render_widget(Clear, toast_area);
        let block = Block::default()
            .title(Span::styled(
                title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(Span::styled(" x ", Style::default().fg(theme.grey1))).right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(theme.bg2));

        let paragraph = Paragraph::new(Span::styled(
            notification.message.as_str(),
            Style::default().fg(theme.fg0),
        ))
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, toast_area);
    }
}
