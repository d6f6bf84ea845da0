use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

use super::quadrant_for_digit;

/// `m` then 1-4: send the selected task to that quadrant
pub(super) fn handle_move(app: &mut App, key: KeyEvent) {
    if let Some(to) = quadrant_for_digit(key.code) {
        app.mode = Mode::Navigate;
        if let Some(id) = app.selected_id()
            && app.session.move_task(&id, to)
        {
            app.clamp_cursors();
            app.select_task(&id);
        }
        return;
    }
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('m')) {
        app.mode = Mode::Navigate;
    }
}
