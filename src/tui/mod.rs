pub mod app;
pub mod ui;

use std::time::Duration;
use std::io;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};

use crate::auth::Accounts;
use crate::config::Config;
use crate::error::AppError;
use crate::store::LocalStore;
use app::{App, InputMode};
use ui::ui;

const TICK: Duration = Duration::from_millis(200);

pub fn run_tui(config: &Config) -> Result<(), AppError> {
    let store = LocalStore::open(config.tasks_path());
    let mut app = App::new(store, Accounts::new(config.data_dir()))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    info!("TUI started");

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = %err, "TUI loop failed");
    }
    res.map_err(AppError::from)
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && handle_key(app, key) {
                return Ok(());
            }
        }
    }
}

/// Applies one key press. Returns `true` when the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if !app.is_logged_in() {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::BackTab => app.login.switch_field(),
            KeyCode::Enter => app.submit_login(),
            KeyCode::Char(c) => app.login.active_input().push(c),
            KeyCode::Backspace => {
                app.login.active_input().pop();
            }
            _ => {}
        }
        return false;
    }

    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Char('a') => app.start_add(),
            KeyCode::Char('c') => app.toggle_hide_completed(),
            KeyCode::Char('o') => app.logout(),
            _ => {}
        },
        InputMode::Adding => match key.code {
            KeyCode::Enter => app.submit_add(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Char(c) => app.input_buffer.push(c),
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            _ => {}
        },
    }
    false
}
