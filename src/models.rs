use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a task, unique within a store.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user, allocated by the account registry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a single entry in somebody's to-do list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: TaskId,
    /// The user that owns the task. Only the owner ever sees it.
    pub owner: UserId,
    /// What needs doing.
    pub text: String,
    /// Whether the task has been checked off.
    #[serde(default)]
    pub is_checked: bool,
    /// Creation timestamp, used for newest-first ordering.
    pub created_at: DateTime<Utc>,
}

/// A registered account.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Optional name from an external profile, shown when the username is blank.
    #[serde(default)]
    pub profile_name: Option<String>,
    /// Argon2 PHC string, salt included.
    pub password_hash: String,
}

impl User {
    pub fn display_name(&self) -> &str {
        if !self.username.is_empty() {
            return &self.username;
        }
        self.profile_name.as_deref().unwrap_or_default()
    }
}

/// The explicit "who is asking" context passed to queries and mutations.
///
/// Lives in memory only; `session.json` keeps just the user id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Session { user: None }
    }

    pub fn for_user(user: User) -> Self {
        Session { user: Some(user) }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }
}
