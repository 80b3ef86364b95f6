use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::models::{Task, User, UserId};

/// Returns the path to the tasks database file (`tasks.json`) in `data_dir`.
pub fn tasks_path(data_dir: &Path) -> PathBuf {
    data_dir.join("tasks.json")
}

/// Returns the path to the account registry (`users.json`) in `data_dir`.
pub fn users_path(data_dir: &Path) -> PathBuf {
    data_dir.join("users.json")
}

/// Returns the path to the persisted login (`session.json`) in `data_dir`.
pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join("session.json")
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io { path: path.display().to_string(), source }
}

/// Reads and deserializes a JSON file.
///
/// Returns `None` if the file does not exist.
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let mut f = OpenOptions::new().read(true).open(path).map_err(|e| io_error(path, e))?;
    let mut s = String::new();
    f.read_to_string(&mut s).map_err(|e| io_error(path, e))?;
    if s.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&s)
        .map(Some)
        .map_err(|source| StorageError::Json { path: path.display().to_string(), source })
}

/// Serializes `value` as pretty JSON and overwrites `path`.
fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let s = serde_json::to_string_pretty(value)
        .map_err(|source| StorageError::Json { path: path.display().to_string(), source })?;
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
        }
    }
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| io_error(path, e))?;
    f.write_all(s.as_bytes()).map_err(|e| io_error(path, e))?;
    Ok(())
}

/// Loads all tasks from `path`.
///
/// A missing file is an empty collection.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, StorageError> {
    Ok(load_json(path)?.unwrap_or_default())
}

/// Saves the given list of tasks, overwriting the existing file.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), StorageError> {
    save_json(path, tasks)
}

pub fn load_users(path: &Path) -> Result<Vec<User>, StorageError> {
    Ok(load_json(path)?.unwrap_or_default())
}

pub fn save_users(path: &Path, users: &[User]) -> Result<(), StorageError> {
    save_json(path, users)
}

/// What `session.json` holds: who is logged in, nothing more.
#[derive(Serialize, Deserialize, Debug, Default)]
struct SavedSession {
    #[serde(default)]
    user_id: Option<UserId>,
}

/// Loads the id of the logged-in user, `None` if nobody is.
pub fn load_session(path: &Path) -> Result<Option<UserId>, StorageError> {
    let saved: Option<SavedSession> = load_json(path)?;
    Ok(saved.and_then(|s| s.user_id))
}

pub fn save_session(path: &Path, user_id: &UserId) -> Result<(), StorageError> {
    save_json(path, &SavedSession { user_id: Some(user_id.clone()) })
}

/// Deletes the session file, if any.
pub fn clear_session(path: &Path) -> Result<(), StorageError> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| io_error(path, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = tasks_path(dir.path());
        assert!(load_tasks(&path).unwrap().is_empty());

        fs::write(&path, "  \n").unwrap();
        assert!(load_tasks(&path).unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = users_path(dir.path());
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_users(&path), Err(StorageError::Json { .. })));
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = session_path(&dir.path().join("nested"));
        assert_eq!(load_session(&path).unwrap(), None);
        save_session(&path, &UserId::new("u3")).unwrap();
        assert_eq!(load_session(&path).unwrap(), Some(UserId::new("u3")));
        clear_session(&path).unwrap();
        assert!(!path.exists());
    }
}
