use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::store::TextRejected;
use crate::tui::app::{App, Mode};
use crate::tui::prompt::Prompt;

/// Keys while typing new task text (Insert) or rewriting it (Edit)
pub(super) fn handle_text_entry(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Enter) => match app.mode {
            Mode::Insert => confirm_insert(app),
            _ => confirm_edit(app),
        },
        (_, KeyCode::Esc) => leave_text_entry(app),
        // Quadrant picker: only meaningful for new tasks
        (_, KeyCode::Tab) if app.mode == Mode::Insert => {
            app.insert_quadrant = app.insert_quadrant.next();
            app.session.set_last_quadrant(app.insert_quadrant);
        }
        (_, KeyCode::BackTab) if app.mode == Mode::Insert => {
            app.insert_quadrant = app.insert_quadrant.prev();
            app.session.set_last_quadrant(app.insert_quadrant);
        }
        (m, KeyCode::Char('a')) if m.contains(KeyModifiers::CONTROL) => app.prompt.home(),
        (m, KeyCode::Char('e')) if m.contains(KeyModifiers::CONTROL) => app.prompt.end(),
        (m, KeyCode::Char('u')) if m.contains(KeyModifiers::CONTROL) => {
            app.prompt.kill_to_start();
        }
        (m, KeyCode::Char(_)) if m.contains(KeyModifiers::CONTROL) => {}
        (_, KeyCode::Char(c)) => {
            // Like an input's maxlength: refuse keystrokes past the limit
            if app.prompt.text().chars().count() < app.max_text_len() {
                app.prompt.insert(c);
            }
        }
        (_, KeyCode::Backspace) => app.prompt.backspace(),
        (_, KeyCode::Delete) => app.prompt.delete(),
        (_, KeyCode::Left) => app.prompt.left(),
        (_, KeyCode::Right) => app.prompt.right(),
        (_, KeyCode::Home) => app.prompt.home(),
        (_, KeyCode::End) => app.prompt.end(),
        _ => {}
    }
}

fn confirm_insert(app: &mut App) {
    let verdict = app
        .session
        .store()
        .validate_text(app.prompt.text())
        .map(str::to_string);
    match verdict {
        // Blank submit does nothing
        Err(TextRejected::Empty) => {}
        Err(e) => app.notify_error(e.to_string()),
        Ok(text) => {
            if let Some(id) = app.session.add_task(&text, app.insert_quadrant) {
                app.select_task(&id);
            }
            app.prompt = Prompt::default();
            if !app.quick_add {
                app.mode = Mode::Navigate;
            }
        }
    }
}

fn confirm_edit(app: &mut App) {
    let Some(id) = app.edit_id.clone() else {
        leave_text_entry(app);
        return;
    };
    let text = app.prompt.text().to_string();
    match app.session.edit_text(&id, &text) {
        // Blank text reverts, like cancelling
        Ok(_) | Err(TextRejected::Empty) => leave_text_entry(app),
        Err(e) => app.notify_error(e.to_string()),
    }
}

fn leave_text_entry(app: &mut App) {
    app.prompt = Prompt::default();
    app.edit_id = None;
    app.quick_add = false;
    app.mode = Mode::Navigate;
}
