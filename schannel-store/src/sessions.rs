//! Saved login sessions.
//!
//! After a successful login the cookie set is kept per user so later
//! commands can reuse it until the site stops accepting it.

use chrono::{DateTime, Utc};
use schannel_core::SessionCookie;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::{default_sessions_dir, load_json_if_exists, remove_file, save_json};

/// A user's cookies as saved after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    /// Account name.
    pub user: String,
    /// When the login happened.
    pub logged_in_at: DateTime<Utc>,
    /// Cookies returned by the login flow.
    pub cookies: Vec<SessionCookie>,
}

impl SavedSession {
    /// Wraps a fresh login result.
    pub fn new(user: impl Into<String>, cookies: Vec<SessionCookie>) -> Self {
        Self {
            user: user.into(),
            logged_in_at: Utc::now(),
            cookies,
        }
    }

    /// True once every cookie with an expiry has expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let mut expiring = self.cookies.iter().filter(|c| c.expires.is_some()).peekable();
        expiring.peek().is_some() && expiring.all(|c| c.is_expired(now))
    }
}

/// Directory of [`SavedSession`] files, one per user.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(default_sessions_dir())
    }
}

impl SessionStore {
    /// Uses `dir` for session files.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, user: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(user)))
    }

    /// Saves a session, replacing any previous one for the same user.
    pub async fn save(&self, session: &SavedSession) -> Result<(), StoreError> {
        save_json(&self.path_for(&session.user), session).await?;
        debug!(user = %session.user, cookies = session.cookies.len(), "Session saved");
        Ok(())
    }

    /// Loads the session of `user`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotLoggedIn` if there is none or it has expired.
    pub async fn load(&self, user: &str) -> Result<SavedSession, StoreError> {
        let session: SavedSession = load_json_if_exists(&self.path_for(user))
            .await?
            .ok_or_else(|| StoreError::NotLoggedIn(user.to_string()))?;
        if session.is_expired(Utc::now()) {
            return Err(StoreError::NotLoggedIn(user.to_string()));
        }
        Ok(session)
    }

    /// Deletes the session of `user`.
    pub async fn remove(&self, user: &str) -> Result<(), StoreError> {
        remove_file(&self.path_for(user)).await
    }
}

/// Percent-encodes every byte outside `[A-Za-z0-9._@-]`, so distinct
/// users never share a file and no name escapes the directory.
fn file_stem(user: &str) -> String {
    use std::fmt::Write;

    let mut stem = String::with_capacity(user.len());
    for byte in user.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.@".contains(&byte) {
            stem.push(char::from(byte));
        } else {
            let _ = write!(stem, "%{byte:02X}");
        }
    }
    stem
}
