use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode};

/// y/n answer to "Clear all tasks?"
pub(super) fn handle_confirm_clear(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char('y' | 'Y')) => {
            app.mode = Mode::Navigate;
            // The key press is the confirmation
            if let Some(Err(e)) = app.session.clear_all(&mut |_: &str| true) {
                tracing::warn!(error = %e, "clear was not saved");
            }
            app.cursors = [0; 4];
        }
        (_, KeyCode::Char('n' | 'N')) | (_, KeyCode::Esc) => {
            app.mode = Mode::Navigate;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::model::task::Quadrant;
    use crate::tui::app::Mode;
    use crate::tui::render::test_helpers::{app_in_dir, press};
    use tempfile::TempDir;

    #[test]
    fn test_yes_clears_and_saves_immediately() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in_dir(dir.path(), &[("A", Quadrant::DoFirst), ("B", Quadrant::Schedule)]);
        press(&mut app, 'C');
        assert_eq!(app.mode, Mode::ConfirmClear);
        press(&mut app, 'y');

        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.session.store().tasks().is_empty());
        assert!(!app.session.save_pending());
        assert!(dir.path().join("eisenhower_matrix_v1.json").exists());
    }

    #[test]
    fn test_no_keeps_tasks() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in_dir(dir.path(), &[("A", Quadrant::DoFirst)]);
        press(&mut app, 'C');
        press(&mut app, 'n');
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.session.store().tasks().len(), 1);
    }
}
