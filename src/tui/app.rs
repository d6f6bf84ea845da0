use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event as TermEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::config_io::{load_config, resolve_data_dir};
use crate::io::storage::FileStorage;
use crate::logging;
use crate::model::config::Config;
use crate::model::task::{Quadrant, Task};
use crate::ops::events::Event;
use crate::ops::session::Session;

use super::input;
use super::prompt::Prompt;
use super::render;
use super::theme::Theme;

/// Longest the loop sleeps when nothing is scheduled
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a new task
    Insert,
    /// Rewriting the selected task's text
    Edit,
    /// Waiting for 1-4 to pick the selected task's new quadrant
    Move,
    /// Waiting for y/n before clearing every task
    ConfirmClear,
}

/// Transient message in the toast line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub is_error: bool,
    pub expires_at: Instant,
}

/// Main application state
pub struct App {
    pub session: Session<FileStorage>,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    /// Pane holding the cursor
    pub focus: Quadrant,
    /// Cursor row per quadrant, indexed by `Quadrant::index`
    pub cursors: [usize; 4],
    pub prompt: Prompt,
    /// Quadrant a new task goes to (Insert mode)
    pub insert_quadrant: Quadrant,
    /// Insert mode stays open after each add and Tab cycles the quadrant
    pub quick_add: bool,
    /// Task being edited (Edit mode)
    pub edit_id: Option<String>,
    pub toast: Option<Toast>,
    pub toast_duration: Duration,
    /// Help overlay visible
    pub show_help: bool,
    events: Receiver<Event>,
}

impl App {
    pub fn new(mut session: Session<FileStorage>, config: &Config) -> Self {
        let (tx, events) = mpsc::channel();
        session.subscribe(move |e| {
            let _ = tx.send(e.clone());
        });
        let last = session.store().last_quadrant();

        App {
            session,
            mode: Mode::Navigate,
            should_quit: false,
            theme: Theme::from_config(&config.ui),
            focus: Quadrant::DoFirst,
            cursors: [0; 4],
            prompt: Prompt::default(),
            insert_quadrant: last,
            quick_add: false,
            edit_id: None,
            toast: None,
            toast_duration: config.toast_duration(),
            show_help: false,
            events,
        }
    }

    pub fn max_text_len(&self) -> usize {
        self.session.store().max_text_len()
    }

    pub fn cursor(&self, quadrant: Quadrant) -> usize {
        self.cursors[quadrant.index()]
    }

    pub fn lane_len(&self, quadrant: Quadrant) -> usize {
        self.session.projected_view().lane(quadrant).len()
    }

    /// Task under the cursor in the focused pane
    pub fn selected_task(&self) -> Option<&Task> {
        let view = self.session.projected_view();
        view.lane(self.focus).get(self.cursor(self.focus)).copied()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected_task().map(|t| t.id.clone())
    }

    /// Focus the pane holding `id` and put the cursor on it
    pub fn select_task(&mut self, id: &str) {
        if let Some((quadrant, index)) = self.session.projected_view().locate(id) {
            self.focus = quadrant;
            self.cursors[quadrant.index()] = index;
        }
    }

    /// Keep every cursor inside its lane after tasks disappear
    pub fn clamp_cursors(&mut self) {
        for q in Quadrant::ALL {
            let len = self.lane_len(q);
            let cursor = &mut self.cursors[q.index()];
            *cursor = (*cursor).min(len.saturating_sub(1));
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.set_toast(message.into(), false);
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.set_toast(message.into(), true);
    }

    fn set_toast(&mut self, message: String, is_error: bool) {
        self.toast = Some(Toast {
            message,
            is_error,
            expires_at: Instant::now() + self.toast_duration,
        });
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.toast = None;
        }
    }

    /// Turn store notifications into toasts
    pub fn process_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                Event::TaskCreated { quadrant, .. } => {
                    self.notify(format!("added to {}", quadrant.label()));
                }
                Event::TaskDeleted { .. } => self.notify("deleted task"),
                Event::TaskMoved { to, .. } => self.notify(format!("moved to {}", to.label())),
                Event::Cleared { removed } => self.notify(format!("cleared {} tasks", removed)),
                Event::SaveFailed(e) => self.notify_error(format!("not saved: {}", e)),
                Event::TaskUpdated { .. }
                | Event::Reordered
                | Event::LastQuadrantChanged(_)
                | Event::Saved => {}
            }
        }
        self.clamp_cursors();
    }

    /// How long the loop may block on input before it has work to do
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        let mut timeout = IDLE_POLL;
        if let Some(save) = self.session.time_until_save(now) {
            timeout = timeout.min(save);
        }
        if let Some(toast) = &self.toast {
            timeout = timeout.min(toast.expires_at.saturating_duration_since(now));
        }
        timeout
    }
}

/// Run the TUI application
pub fn run(data_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = resolve_data_dir(data_dir)?;
    let config = load_config(&data_dir)?;
    logging::init_file(&data_dir)?;
    tracing::info!(dir = %data_dir.display(), "starting tui");

    let storage = FileStorage::new(&data_dir, config.quota_bytes);
    let session = Session::open(storage, &config, Some(data_dir.clone()));
    let mut app = App::new(session, &config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Write whatever the debounce was still holding
    let flushed = app.session.flush_pending();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result?;
    flushed?;
    Ok(())
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.process_events();
        app.expire_toast(Instant::now());
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                TermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                TermEvent::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }

        // Failures arrive as SaveFailed events on the next pass
        let _ = app.session.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
