use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{AppError, ConfigError};

/// Installs the global `tracing` subscriber, appending to `todolist.log`.
///
/// Logs go to a file because the TUI owns the terminal. Installing twice is
/// harmless; the second call keeps the first subscriber.
pub fn init(config: &Config) -> Result<(), AppError> {
    config.ensure_data_dir()?;
    let filter = EnvFilter::try_new(&config.log_filter).map_err(|e| ConfigError::InvalidLogFilter {
        filter: config.log_filter.clone(),
        reason: e.to_string(),
    })?;
    let file = OpenOptions::new().create(true).append(true).open(config.log_path())?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
    Ok(())
}
