use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::storage::FileStorage;
use crate::model::config::Config;
use crate::model::task::Quadrant;
use crate::ops::session::Session;
use crate::tui::app::App;
use crate::tui::input::handle_key;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// App over file storage in `dir`, seeded with `tasks` in order.
/// Seeding goes through the session, so `lastQuadrant` ends up as the last
/// task's quadrant and nothing is written until a save runs.
pub fn app_in_dir(dir: &Path, tasks: &[(&str, Quadrant)]) -> App {
    build_app(FileStorage::new(dir, Config::default().quota_bytes), tasks)
}

/// App whose storage refuses every write (zero quota), for tests that never
/// look at disk.
pub fn app_with_tasks(tasks: &[(&str, Quadrant)]) -> App {
    let dir = std::env::temp_dir().join("eisen-test-never-written");
    build_app(FileStorage::new(dir, 0), tasks)
}

fn build_app(storage: FileStorage, tasks: &[(&str, Quadrant)]) -> App {
    let config = Config::default();
    let mut session = Session::open(storage, &config, None);
    for (text, quadrant) in tasks {
        session.add_task(text, *quadrant).unwrap();
    }
    App::new(session, &config)
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Send one character key
pub fn press(app: &mut App, c: char) {
    handle_key(app, key(KeyCode::Char(c)));
}

pub fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
        press(app, c);
    }
}

/// Texts of one quadrant's lane, top to bottom
pub fn lane_texts(app: &App, quadrant: Quadrant) -> Vec<String> {
    app.session
        .projected_view()
        .lane(quadrant)
        .iter()
        .map(|t| t.text.clone())
        .collect()
}
