use std::path::{Path, PathBuf};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use tracing::{info, warn};

use crate::error::AuthError;
use crate::models::{Session, User, UserId};
use crate::storage::{clear_session, load_session, load_users, save_session, save_users, session_path, users_path};

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// A stored hash that does not parse never verifies.
fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

/// The account registry and the persisted login.
pub struct Accounts {
    users_path: PathBuf,
    session_path: PathBuf,
}

impl Accounts {
    pub fn new(data_dir: &Path) -> Self {
        Accounts { users_path: users_path(data_dir), session_path: session_path(data_dir) }
    }

    pub fn users(&self) -> Result<Vec<User>, AuthError> {
        Ok(load_users(&self.users_path)?)
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self.users()?.into_iter().find(|u| u.username == username))
    }

    /// Registers a new account.
    pub fn create_user(&self, username: &str, password: &str, profile_name: Option<String>) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        let mut users = self.users()?;
        if users.iter().any(|u| u.username == username) {
            return Err(AuthError::UserExists(username.to_string()));
        }

        let next = users
            .iter()
            .filter_map(|u| u.id.0.strip_prefix('u').and_then(|n| n.parse::<u64>().ok()))
            .max()
            .unwrap_or(0)
            + 1;
        let user = User {
            id: UserId(format!("u{next}")),
            username: username.to_string(),
            profile_name,
            password_hash: hash_password(password)?,
        };
        users.push(user.clone());
        save_users(&self.users_path, &users)?;
        info!(user = %user.id, username, "User created");
        Ok(user)
    }

    /// Checks the credentials and persists the resulting session.
    pub fn login_with_password(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let user = match self.find_by_username(username.trim())? {
            Some(u) if verify_password(password, &u.password_hash) => u,
            _ => {
                warn!(username, "Login failed");
                return Err(AuthError::InvalidCredentials);
            }
        };
        save_session(&self.session_path, &user.id)?;
        let session = Session::for_user(user);
        info!(username, "Logged in");
        Ok(session)
    }

    pub fn logout(&self) -> Result<Session, AuthError> {
        clear_session(&self.session_path)?;
        info!("Logged out");
        Ok(Session::anonymous())
    }

    /// The session saved by the last login.
    ///
    /// A session whose user has since vanished from the registry is anonymous.
    pub fn current_session(&self) -> Result<Session, AuthError> {
        let Some(user_id) = load_session(&self.session_path)? else {
            return Ok(Session::anonymous());
        };
        Ok(match self.users()?.into_iter().find(|u| u.id == user_id) {
            Some(u) => Session::for_user(u),
            None => Session::anonymous(),
        })
    }
}
