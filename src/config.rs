use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "TODOLIST_DATA_DIR";
/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV: &str = "TODOLIST_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

/// Where the application keeps its files and how loudly it logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Resolves the configuration.
    ///
    /// The data directory is determined in the following order:
    /// 1. `data_dir` (the `--data-dir` flag).
    /// 2. `TODOLIST_DATA_DIR` environment variable.
    /// 3. `~/.local/share/todolist` (on Linux).
    /// 4. `.` (fallback).
    pub fn resolve(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .or_else(|| std::env::var(DATA_DIR_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| {
                dirs::data_local_dir()
                    .map(|p| p.join("todolist"))
                    .unwrap_or_else(|| PathBuf::from("."))
            });
        let log_filter = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
        Config { data_dir, log_filter }
    }

    /// A configuration rooted at `data_dir` with the default log filter.
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Config { data_dir: data_dir.into(), log_filter: DEFAULT_LOG_FILTER.to_string() }
    }

    pub fn tasks_path(&self) -> PathBuf {
        crate::storage::tasks_path(&self.data_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("todolist.log")
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Creates the data directory if it is missing.
    pub fn ensure_data_dir(&self) -> Result<(), ConfigError> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir).map_err(|source| ConfigError::DataDir {
                path: self.data_dir.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}
