use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use reviewdeck_core::review::Review;

use super::popup::truncate_str;
use crate::app::App;
use crate::theme::Theme;

/// Horizontally scrolling row of review cards
pub struct ReviewStripWidget;

impl ReviewStripWidget {
    /// Split the feed area into left arrow, card strip and right arrow columns
    pub fn split(area: Rect) -> [Rect; 3] {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(2),
            ])
            .split(area);
        [chunks[0], chunks[1], chunks[2]]
    }

    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let [left, strip, right] = Self::split(area);

        frame.render_widget(
            Block::default().style(Style::default().bg(theme.bg0)),
            area,
        );

        if app.view.items.is_empty() && !app.view.loading {
            Self::render_empty(frame, strip, app);
            return;
        }

        Self::render_arrow(frame, left, "◀", app.view.show_left_affordance, theme);
        Self::render_arrow(frame, right, "▶", app.view.show_right_affordance, theme);

        let offset = app.layout.to_columns(app.view.position.offset);
        let window_end = offset + u32::from(strip.width);
        let cards = app.view.items.len() + usize::from(app.view.loading);

        for index in 0..cards {
            let (start, end) = app.layout.card_span(index);
            if end <= offset {
                continue;
            }
            if start >= window_end {
                break;
            }

            let x0 = start.max(offset) - offset;
            let x1 = end.min(window_end) - offset;
            let card_area = Rect::new(strip.x + x0 as u16, strip.y, (x1 - x0) as u16, strip.height);

            // Drop the border on a side cut off by the viewport
            let mut borders = Borders::ALL;
            if start < offset {
                borders.remove(Borders::LEFT);
            }
            if end > window_end {
                borders.remove(Borders::RIGHT);
            }

            match app.view.items.get(index) {
                Some(review) => {
                    Self::render_card(frame, card_area, borders, review, app.config.ui.show_dates, theme)
                }
                None => Self::render_placeholder(frame, card_area, borders, theme),
            }
        }
    }

    fn render_card(
        frame: &mut Frame,
        area: Rect,
        borders: Borders,
        review: &Review,
        show_dates: bool,
        theme: &Theme,
    ) {
        let title_width = area.width.saturating_sub(4) as usize;
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", truncate_str(&review.name, title_width.max(4))),
                Style::default().fg(theme.fg0).add_modifier(Modifier::BOLD),
            ))
            .borders(borders)
            .border_style(Style::default().fg(theme.grey0))
            .style(Style::default().bg(theme.bg1));

        let mut lines = vec![Line::from(vec![
            Span::styled(review.stars(), Style::default().fg(theme.star)),
            Span::styled(
                format!(" {}/5", review.rating),
                Style::default().fg(theme.grey1),
            ),
        ])];
        if show_dates {
            lines.push(Line::from(Span::styled(
                review.created_at.format("%B %Y").to_string(),
                Style::default().fg(theme.grey1),
            )));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("\u{201c}{}\u{201d}", review.comment),
            Style::default().fg(theme.fg0),
        )));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_placeholder(frame: &mut Frame, area: Rect, borders: Borders, theme: &Theme) {
        let block = Block::default()
            .borders(borders)
            .border_style(Style::default().fg(theme.bg2))
            .style(Style::default().bg(theme.bg1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 {
            return;
        }
        let middle = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
        let text = Paragraph::new(Span::styled(
            "Loading reviews…",
            Style::default().fg(theme.grey1).add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(text, middle);
    }

    fn render_arrow(frame: &mut Frame, area: Rect, symbol: &str, visible: bool, theme: &Theme) {
        if !visible || area.height == 0 {
            return;
        }
        let middle = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
        let arrow = Paragraph::new(Span::styled(
            symbol,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        frame.render_widget(arrow, middle);
    }

    fn render_empty(frame: &mut Frame, area: Rect, app: &App) {
        let message = if app.view.failures > 0 {
            "Reviews are unavailable right now. Press r to retry."
        } else {
            "No reviews yet. Press w to write the first one."
        };
        if area.height == 0 {
            return;
        }
        let middle = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
        let paragraph = Paragraph::new(Span::styled(message, Style::default().fg(app.theme.grey2)))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, middle);
    }
}
