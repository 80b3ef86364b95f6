//! # todolist
//!
//! A login-gated, terminal to-do list. A CLI for quick entry, and a TUI that
//! keeps the list live while other commands change it.
//!
//! ## Usage
//!
//! ```bash
//! todolist register ada --password secret
//! todolist login ada --password secret
//! todolist add "Buy milk"
//! todolist list --hide-completed
//! todolist check 1
//! todolist remove 1
//! todolist            # interactive UI
//! ```
//!
//! ## Data Storage
//!
//! Tasks, users and the saved login live in `~/.local/share/todolist/` on
//! Linux. Override with `--data-dir` or the `TODOLIST_DATA_DIR` environment
//! variable. Logs are appended to `todolist.log` in the same directory, with
//! the level taken from `TODOLIST_LOG` (default `info`).

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use todolist::commands::*;
use todolist::config::Config;
use todolist::error::AppError;
use todolist::logging;
use todolist::models::TaskId;
use todolist::tui::run_tui;

#[derive(Parser)]
#[command(name = "todolist")]
#[command(about = "Login-gated terminal to-do list", long_about = None)]
struct Cli {
    /// Directory holding tasks, users and the session
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        username: String,
        #[arg(short, long)]
        password: String,
        /// Profile name shown when the username is blank
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Log in and remember the session
    Login {
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the saved session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Add a new task
    Add {
        /// Task text (quoted if it has spaces)
        text: String,
    },
    /// List your tasks, newest first
    List {
        /// Leave out checked tasks
        #[arg(long)]
        hide_completed: bool,
    },
    /// Check or uncheck a task
    Check { id: u64 },
    /// Remove a task
    Remove { id: u64 },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        // Completions touch nothing on disk, so they skip config and logging.
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "todolist", &mut io::stdout());
            Ok(())
        }
        command => {
            let config = Config::resolve(cli.data_dir);
            logging::init(&config)?;
            dispatch(&config, command)
        }
    }
}

fn dispatch(config: &Config, command: Option<Commands>) -> Result<(), AppError> {
    match command {
        Some(Commands::Register { username, password, name }) => cmd_register(config, &username, &password, name),
        Some(Commands::Login { username, password }) => cmd_login(config, &username, &password),
        Some(Commands::Logout) => cmd_logout(config),
        Some(Commands::Whoami) => cmd_whoami(config),
        Some(Commands::Add { text }) => cmd_add(config, &text).map(|_| ()),
        Some(Commands::List { hide_completed }) => cmd_list(config, hide_completed),
        Some(Commands::Check { id }) => cmd_check(config, TaskId(id)),
        Some(Commands::Remove { id }) => cmd_remove(config, TaskId(id)),
        Some(Commands::Completions { .. }) => Err(AppError::Usage("completions take no data directory".into())),
        Some(Commands::Ui) | None => run_tui(config),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
