pub mod help_overlay;
pub mod matrix_view;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::App;

/// Main render function: matrix, status row, toast line, overlays
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),    // 2x2 matrix
            Constraint::Length(1), // status row / prompt
            Constraint::Length(1), // toast line
        ])
        .split(area);

    matrix_view::render_matrix(frame, app, chunks[0]);
    status_row::render_status_row(frame, app, chunks[1]);
    status_row::render_toast_line(frame, app, chunks[2]);

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, area);
    }
}
