use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::model::task::{Quadrant, Task};
use crate::tui::app::App;
use crate::util::unicode;

/// Render the four quadrant panes in a 2x2 grid
pub fn render_matrix(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let view = app.session.projected_view();
    for (quadrant, tasks) in view.iter() {
        let row = rows[quadrant.index() / 2];
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row);
        render_pane(frame, app, quadrant, tasks, cols[quadrant.index() % 2]);
    }
}

fn render_pane(frame: &mut Frame, app: &App, quadrant: Quadrant, tasks: &[&Task], area: Rect) {
    let bg = app.theme.background;
    let accent = app.theme.quadrant_color(quadrant);
    let focused = app.focus == quadrant;

    let title_style = if focused {
        Style::default()
            .fg(accent)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(accent).bg(bg)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if focused {
            BorderType::Thick
        } else {
            BorderType::Plain
        })
        .border_style(Style::default().fg(accent).bg(bg))
        .title(Span::styled(
            format!(" {} {} ({}) ", quadrant.index() + 1, quadrant.label(), tasks.len()),
            title_style,
        ))
        .style(Style::default().bg(bg));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if tasks.is_empty() {
        let empty = Paragraph::new(" No tasks").style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, inner);
        return;
    }

    let height = inner.height as usize;
    let width = inner.width as usize;
    let cursor = app.cursor(quadrant).min(tasks.len() - 1);
    // Keep the cursor row on screen
    let scroll = if height == 0 {
        0
    } else {
        cursor.saturating_sub(height - 1)
    };

    let lines: Vec<Line> = tasks
        .iter()
        .enumerate()
        .skip(scroll)
        .take(height)
        .map(|(i, task)| task_line(app, task, focused && i == cursor, width))
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), inner);
}

fn task_line<'a>(app: &App, task: &Task, selected: bool, width: usize) -> Line<'a> {
    let bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let mark = if task.completed { "[x] " } else { "[ ] " };

    let mut text_style = if task.completed {
        Style::default()
            .fg(app.theme.dim)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(app.theme.text_bright)
    };
    text_style = text_style.bg(bg);
    if selected {
        text_style = text_style.add_modifier(Modifier::BOLD);
    }

    let prefix = format!(" {}", mark);
    let room = width.saturating_sub(unicode::display_width(&prefix));
    let text = unicode::truncate_to_width(&task.text, room);

    let mut spans = vec![
        Span::styled(prefix, Style::default().fg(app.theme.dim).bg(bg)),
        Span::styled(text, text_style),
    ];

    // Pad cursor line
    if selected {
        let used: usize = spans
            .iter()
            .map(|s| unicode::display_width(&s.content))
            .sum();
        if used < width {
            spans.push(Span::styled(" ".repeat(width - used), Style::default().bg(bg)));
        }
    }
    Line::from(spans)
}
