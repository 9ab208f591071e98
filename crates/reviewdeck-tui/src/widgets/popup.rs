use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::app::{FormField, SubmitForm};
use crate::theme::Theme;

pub struct PopupWidget;

impl PopupWidget {
    /// Render the guest review form
    pub fn render_submit_form(frame: &mut Frame, form: &SubmitForm, submitting: bool, theme: &Theme) {
        let area = frame.area();
        let popup_width = 60u16.min(area.width.saturating_sub(4));
        let popup_height = 14u16.min(area.height.saturating_sub(2));
        let popup_area = centered_rect(popup_width, popup_height, area);

        frame.render_widget(Clear, popup_area);

        let title = if submitting { " Sending… " } else { " Write a review " };
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .style(Style::default().bg(theme.bg1));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Name
                Constraint::Length(2), // Rating
                Constraint::Min(3),    // Comment
                Constraint::Length(1), // Hint
            ])
            .split(inner);

        let field_width = inner.width.saturating_sub(12) as usize;
        let name = Paragraph::new(Self::field_line(
            "Name",
            &truncate_start(&form.name, field_width),
            form.field == FormField::Name,
            theme,
        ));
        frame.render_widget(name, chunks[0]);

        let stars = format!(
            "{}{}",
            "★".repeat(form.rating as usize),
            "☆".repeat(5usize.saturating_sub(form.rating as usize))
        );
        let rating = Paragraph::new(Self::field_line(
            "Rating",
            &stars,
            form.field == FormField::Rating,
            theme,
        ));
        frame.render_widget(rating, chunks[1]);

        let comment = Paragraph::new(Self::field_line(
            "Comment",
            &form.comment,
            form.field == FormField::Comment,
            theme,
        ))
        .wrap(Wrap { trim: false });
        frame.render_widget(comment, chunks[2]);

        let hint = Paragraph::new(Line::from(vec![
            Span::styled("Tab", Style::default().fg(theme.green).add_modifier(Modifier::BOLD)),
            Span::styled(" next field  ", Style::default().fg(theme.grey1)),
            Span::styled("Enter", Style::default().fg(theme.green).add_modifier(Modifier::BOLD)),
            Span::styled(" send  ", Style::default().fg(theme.grey1)),
            Span::styled("Esc", Style::default().fg(theme.error).add_modifier(Modifier::BOLD)),
            Span::styled(" cancel", Style::default().fg(theme.grey1)),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(hint, chunks[3]);
    }

    fn field_line<'a>(label: &'a str, value: &str, focused: bool, theme: &Theme) -> Line<'a> {
        let label_style = if focused {
            Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.grey1)
        };
        let cursor = if focused { "▏" } else { "" };
        Line::from(vec![
            Span::styled(format!("{:>8}: ", label), label_style),
            Span::styled(format!("{}{}", value, cursor), Style::default().fg(theme.fg0)),
        ])
    }

    /// Render the key reference
    pub fn render_help(frame: &mut Frame, theme: &Theme) {
        let area = frame.area();
        let popup_area = centered_rect(
            44u16.min(area.width.saturating_sub(4)),
            12u16.min(area.height.saturating_sub(2)),
            area,
        );
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keys ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.info))
            .style(Style::default().bg(theme.bg1));

        let keys = [
            ("←/→  h/l", "scroll a page"),
            ("H/L", "scroll one card"),
            ("r", "reload reviews"),
            ("w", "write a review"),
            ("x/Esc", "dismiss message"),
            ("?", "this help"),
            ("q", "quit"),
        ];
        let lines: Vec<Line> = keys
            .iter()
            .map(|(key, description)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>10}  ", key),
                        Style::default().fg(theme.yellow).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(*description, Style::default().fg(theme.fg0)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Truncate to at most `max_width` display columns, ending with an ellipsis
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    let width: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if width <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Keep the tail of a string that is being typed
fn truncate_start(s: &str, max_width: usize) -> String {
    let mut kept: Vec<char> = Vec::new();
    let mut used = 0;
    for c in s.chars().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        kept.push(c);
        used += w;
    }
    kept.into_iter().rev().collect()
}
