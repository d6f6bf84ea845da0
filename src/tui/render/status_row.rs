use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::task::Quadrant;
use crate::ops::session::CLEAR_PROMPT;
use crate::tui::app::{App, Mode};
use crate::util::unicode;

const NAVIGATE_HINT: &str = "a add  A quick-add  e edit  space done  m move  ? help  q quit";

/// Render the status row: key hints, or the prompt while typing
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let (mut spans, hint): (Vec<Span>, String) = match app.mode {
        Mode::Navigate => {
            let mut spans = vec![Span::styled(format!(" {}", NAVIGATE_HINT), dim)];
            if app.session.save_pending() {
                spans.push(Span::styled("  \u{2022}", dim)); // unsaved marker
            }
            (spans, String::new())
        }
        Mode::Insert | Mode::Edit => {
            let label = match app.mode {
                Mode::Insert => format!(" {} \u{203A} ", app.insert_quadrant.label()),
                _ => " Edit \u{203A} ".to_string(),
            };
            let (before, after) = app.prompt.split();
            let spans = vec![
                Span::styled(
                    label,
                    Style::default()
                        .fg(app.theme.quadrant_color(app.insert_quadrant))
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    before.to_string(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)), // ▌ cursor
                Span::styled(
                    after.to_string(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
            ];
            let count = format!("{}/{}", app.prompt.char_count(), app.max_text_len());
            let hint = if app.mode == Mode::Insert {
                format!("{}  Tab quadrant ", count)
            } else {
                format!("{} ", count)
            };
            (spans, hint)
        }
        Mode::Move => {
            let mut spans = vec![Span::styled(" Move to:", dim)];
            for q in Quadrant::ALL {
                spans.push(Span::styled(
                    format!("  {} {}", q.index() + 1, q.label()),
                    Style::default().fg(app.theme.quadrant_color(q)).bg(bg),
                ));
            }
            (spans, "Esc cancel ".to_string())
        }
        Mode::ConfirmClear => (
            vec![Span::styled(
                format!(" {} (y/n)", CLEAR_PROMPT),
                Style::default()
                    .fg(app.theme.red)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            )],
            String::new(),
        ),
    };

    // Right-aligned hint when it fits
    let content_width: usize = spans
        .iter()
        .map(|s| unicode::display_width(&s.content))
        .sum();
    let hint_width = unicode::display_width(&hint);
    if !hint.is_empty() && content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, dim));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Render the toast line: the current toast, else a standing save error
pub fn render_toast_line(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let error_style = Style::default().fg(app.theme.red).bg(bg);

    let line = if let Some(toast) = &app.toast {
        let style = if toast.is_error {
            error_style
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        Line::from(Span::styled(format!(" {}", toast.message), style))
    } else if let Some(err) = app.session.last_error() {
        Line::from(Span::styled(format!(" not saved: {}", err), error_style))
    } else {
        Line::from("")
    };

    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}
