mod confirm;
mod edit;
mod move_mode;
mod navigate;

use crossterm::event::{KeyCode, KeyEvent};

use crate::model::task::Quadrant;

use super::app::{App, Mode};

use confirm::handle_confirm_clear;
use edit::handle_text_entry;
use move_mode::handle_move;
use navigate::handle_navigate;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // Help overlay swallows the key that closes it
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Insert | Mode::Edit => handle_text_entry(app, key),
        Mode::Move => handle_move(app, key),
        Mode::ConfirmClear => handle_confirm_clear(app, key),
    }
}

/// Handle a bracketed paste event. Only active while typing task text.
pub fn handle_paste(app: &mut App, text: &str) {
    if !matches!(app.mode, Mode::Insert | Mode::Edit) || text.is_empty() {
        return;
    }
    let room = app
        .max_text_len()
        .saturating_sub(app.prompt.text().chars().count());
    let clipped: String = text.chars().take(room).collect();
    app.prompt.insert_str(&clipped);
}

/// Digit keys 1-4 name quadrants in display order
fn quadrant_for_digit(code: KeyCode) -> Option<Quadrant> {
    match code {
        KeyCode::Char(c @ '1'..='4') => Quadrant::from_index(c as usize - '1' as usize),
        _ => None,
    }
}
