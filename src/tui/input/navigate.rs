use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::task::Quadrant;
use crate::ops::reorder::ProposedOrder;
use crate::tui::app::{App, Mode};
use crate::tui::prompt::Prompt;

use super::quadrant_for_digit;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            app.should_quit = true;
        }
        return;
    }

    if let Some(quadrant) = quadrant_for_digit(key.code) {
        app.focus = quadrant;
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,

        KeyCode::Up | KeyCode::Char('k') => move_cursor(app, -1),
        KeyCode::Down | KeyCode::Char('j') => move_cursor(app, 1),
        KeyCode::Left | KeyCode::Char('h') => app.focus = app.focus.prev(),
        KeyCode::Right | KeyCode::Char('l') => app.focus = app.focus.next(),
        KeyCode::Home | KeyCode::Char('g') => app.cursors[app.focus.index()] = 0,
        KeyCode::End | KeyCode::Char('G') => {
            let len = app.lane_len(app.focus);
            app.cursors[app.focus.index()] = len.saturating_sub(1);
        }

        KeyCode::Char('a') => begin_insert(app, app.focus, false),
        KeyCode::Char('A') => {
            let last = app.session.store().last_quadrant();
            begin_insert(app, last, true);
        }
        KeyCode::Char('e') | KeyCode::Enter => begin_edit(app),
        KeyCode::Char(' ') => {
            if let Some(id) = app.selected_id() {
                app.session.toggle_completed(&id);
            }
        }
        KeyCode::Char('x') | KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = app.selected_id() {
                app.session.delete_task(&id);
                app.clamp_cursors();
            }
        }
        KeyCode::Char('m') => {
            if app.selected_task().is_some() {
                app.mode = Mode::Move;
            }
        }
        KeyCode::Char('K') => shift_selected(app, true),
        KeyCode::Char('J') => shift_selected(app, false),
        KeyCode::Char('H') => drag_selected(app, app.focus.prev()),
        KeyCode::Char('L') => drag_selected(app, app.focus.next()),
        KeyCode::Char('C') => {
            if app.session.store().tasks().is_empty() {
                app.notify("nothing to clear");
            } else {
                app.mode = Mode::ConfirmClear;
            }
        }
        _ => {}
    }
}

/// Move the cursor within the focused pane. Running off the top or bottom
/// edge continues into the pane above or below.
fn move_cursor(app: &mut App, delta: i32) {
    let focus = app.focus;
    let len = app.lane_len(focus);
    let cursor = app.cursor(focus);

    if delta < 0 {
        if cursor > 0 {
            app.cursors[focus.index()] = cursor - 1;
        } else if let Some(above) = focus.index().checked_sub(2).and_then(Quadrant::from_index) {
            app.focus = above;
            app.cursors[above.index()] = app.lane_len(above).saturating_sub(1);
        }
    } else if cursor + 1 < len {
        app.cursors[focus.index()] = cursor + 1;
    } else if let Some(below) = Quadrant::from_index(focus.index() + 2) {
        app.focus = below;
        app.cursors[below.index()] = 0;
    }
}

fn begin_insert(app: &mut App, quadrant: Quadrant, quick_add: bool) {
    app.insert_quadrant = quadrant;
    app.quick_add = quick_add;
    app.prompt = Prompt::default();
    app.mode = Mode::Insert;
}

fn begin_edit(app: &mut App) {
    let Some(task) = app.selected_task() else {
        return;
    };
    let (id, prompt) = (task.id.clone(), Prompt::with_text(&task.text));
    app.edit_id = Some(id);
    app.prompt = prompt;
    app.mode = Mode::Edit;
}

/// K/J: swap the selected task with its neighbour
fn shift_selected(app: &mut App, up: bool) {
    let Some(id) = app.selected_id() else {
        return;
    };
    let proposal = ProposedOrder::shift(&app.session.projected_view(), &id, up);
    if let Some(proposal) = proposal {
        app.session.reorder(&proposal);
        app.select_task(&id);
    }
}

/// H/L: drag the selected task to the end of another quadrant
fn drag_selected(app: &mut App, to: Quadrant) {
    let Some(id) = app.selected_id() else {
        return;
    };
    let proposal = ProposedOrder::transfer(&app.session.projected_view(), &id, to, None);
    if let Some(proposal) = proposal
        && app.session.reorder(&proposal)
    {
        app.clamp_cursors();
        app.select_task(&id);
    }
}

#[cfg(test)]
mod tests {
    use crate::model::task::Quadrant;
    use crate::tui::app::Mode;
    use crate::tui::render::test_helpers::{app_with_tasks, lane_texts, press};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cursor_walks_down_into_lower_pane() {
        let mut app = app_with_tasks(&[
            ("A", Quadrant::DoFirst),
            ("B", Quadrant::DoFirst),
            ("C", Quadrant::Delegate),
        ]);
        press(&mut app, 'j');
        assert_eq!(app.selected_task().unwrap().text, "B");
        press(&mut app, 'j');
        assert_eq!(app.focus, Quadrant::Delegate);
        assert_eq!(app.selected_task().unwrap().text, "C");
        press(&mut app, 'k');
        assert_eq!(app.focus, Quadrant::DoFirst);
        assert_eq!(app.selected_task().unwrap().text, "B");
    }

    #[test]
    fn test_left_right_and_digits_change_focus() {
        let mut app = app_with_tasks(&[]);
        press(&mut app, 'l');
        assert_eq!(app.focus, Quadrant::Schedule);
        press(&mut app, 'h');
        press(&mut app, 'h');
        assert_eq!(app.focus, Quadrant::Eliminate);
        press(&mut app, '3');
        assert_eq!(app.focus, Quadrant::Delegate);
    }

    #[test]
    fn test_space_toggles_and_x_deletes() {
        let mut app = app_with_tasks(&[("Laundry", Quadrant::DoFirst)]);
        press(&mut app, ' ');
        assert!(app.selected_task().unwrap().completed);
        press(&mut app, 'x');
        assert!(app.session.store().tasks().is_empty());
        assert!(app.session.save_pending());
    }

    #[test]
    fn test_shift_reorders_within_pane() {
        let mut app = app_with_tasks(&[
            ("A", Quadrant::Schedule),
            ("B", Quadrant::Schedule),
            ("C", Quadrant::Schedule),
        ]);
        press(&mut app, '2');
        press(&mut app, 'J');
        assert_eq!(lane_texts(&app, Quadrant::Schedule), vec!["B", "A", "C"]);
        assert_eq!(app.cursor(Quadrant::Schedule), 1);

        // Already at the top after moving back up; K again does nothing
        press(&mut app, 'K');
        press(&mut app, 'K');
        assert_eq!(lane_texts(&app, Quadrant::Schedule), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_drag_appends_to_next_quadrant() {
        let mut app = app_with_tasks(&[
            ("A", Quadrant::DoFirst),
            ("B", Quadrant::Schedule),
        ]);
        press(&mut app, 'L');
        assert_eq!(lane_texts(&app, Quadrant::Schedule), vec!["B", "A"]);
        assert!(lane_texts(&app, Quadrant::DoFirst).is_empty());
        assert_eq!(app.focus, Quadrant::Schedule);
        assert_eq!(app.selected_task().unwrap().text, "A");

        press(&mut app, 'H');
        assert_eq!(lane_texts(&app, Quadrant::DoFirst), vec!["A"]);
    }

    #[test]
    fn test_quick_add_starts_in_last_quadrant() {
        let mut app = app_with_tasks(&[("Old", Quadrant::Delegate)]);
        press(&mut app, 'A');
        assert_eq!(app.mode, Mode::Insert);
        assert!(app.quick_add);
        assert_eq!(app.insert_quadrant, Quadrant::Delegate);

        let mut app = app_with_tasks(&[]);
        press(&mut app, '4');
        press(&mut app, 'a');
        assert!(!app.quick_add);
        assert_eq!(app.insert_quadrant, Quadrant::Eliminate);
    }

    #[test]
    fn test_clear_needs_tasks() {
        let mut app = app_with_tasks(&[]);
        press(&mut app, 'C');
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.toast.as_ref().unwrap().message, "nothing to clear");
    }

    #[test]
    fn test_edit_prefills_prompt() {
        let mut app = app_with_tasks(&[("Write report", Quadrant::DoFirst)]);
        press(&mut app, 'e');
        assert_eq!(app.mode, Mode::Edit);
        assert_eq!(app.prompt.text(), "Write report");
        assert_eq!(app.edit_id, app.selected_id());
    }
}
