use thiserror::Error;

use crate::models::TaskId;

/// Errors raised by the task store and the mutation methods it serves.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The caller has no authenticated user.
    #[error("Not authorized: log in first")]
    NotLoggedIn,

    /// The task exists but belongs to someone else.
    #[error("Access denied to task {0}")]
    NotAuthorized(TaskId),

    #[error("Task {0} not found")]
    TaskNotFound(TaskId),

    #[error("Task text must not be empty")]
    EmptyText,

    #[error("Unknown subscription topic '{0}'")]
    UnknownTopic(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors raised while reading or writing the JSON files.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by the account registry.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("User '{0}' already exists")]
    UserExists(String),

    /// Deliberately the same message for unknown users and bad passwords.
    #[error("Login failed: incorrect username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidLogFilter { filter: String, reason: String },

    #[error("Cannot create data directory {path}: {source}")]
    DataDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error for CLI commands and the TUI.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}
