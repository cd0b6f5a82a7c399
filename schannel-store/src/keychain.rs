//! Remembered credentials.
//!
//! Passwords live in the system's secure credential storage:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! The list of known account names is a plain JSON file next to the
//! config, most recently used first.
//!
//! ## Usage
//!
//! ```ignore
//! use schannel_store::{CredentialStore, SystemKeychain};
//!
//! let keychain = SystemKeychain::new();
//! keychain.remember("alice", "hunter2")?;
//! assert_eq!(keychain.recall("alice")?.as_deref(), Some("hunter2"));
//! keychain.forget("alice")?;
//! ```

use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::{default_accounts_path, load_json_if_exists, save_json};

/// Keychain service name for account passwords.
const KEYCHAIN_SERVICE: &str = "schannel";

// ============================================================================
// Credential Store
// ============================================================================

/// Storage for account passwords.
pub trait CredentialStore: Send + Sync {
    /// Stores or replaces the password for `user`.
    fn remember(&self, user: &str, password: &str) -> Result<(), StoreError>;

    /// Returns the stored password for `user`, if any.
    fn recall(&self, user: &str) -> Result<Option<String>, StoreError>;

    /// Deletes the stored password; a missing entry is not an error.
    fn forget(&self, user: &str) -> Result<(), StoreError>;
}

/// [`CredentialStore`] backed by the OS keychain.
#[derive(Debug, Clone)]
pub struct SystemKeychain {
    service: String,
}

impl Default for SystemKeychain {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemKeychain {
    /// Uses the default service name.
    pub fn new() -> Self {
        Self::with_service(KEYCHAIN_SERVICE)
    }

    /// Uses a custom service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, user: &str) -> Result<Entry, StoreError> {
        Ok(Entry::new(&self.service, user)?)
    }
}

impl CredentialStore for SystemKeychain {
    fn remember(&self, user: &str, password: &str) -> Result<(), StoreError> {
        self.entry(user)?.set_password(password)?;
        debug!(user, "Password stored in keychain");
        Ok(())
    }

    fn recall(&self, user: &str) -> Result<Option<String>, StoreError> {
        match self.entry(user)?.get_password() {
            Ok(password) if !password.is_empty() => Ok(Some(password)),
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn forget(&self, user: &str) -> Result<(), StoreError> {
        match self.entry(user)?.delete_credential() {
            Ok(()) => {
                debug!(user, "Password deleted from keychain");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Account List
// ============================================================================

/// Known account names, most recently used first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountList {
    #[serde(default)]
    accounts: Vec<String>,
}

impl AccountList {
    /// Loads `accounts.json` from the config directory.
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&default_accounts_path()).await
    }

    /// Loads an account list; a missing file is an empty list.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        Ok(load_json_if_exists(path).await?.unwrap_or_default())
    }

    /// Saves to the config directory.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.save_to(&default_accounts_path()).await
    }

    /// Saves to a specific path.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await
    }

    /// Account names.
    pub fn names(&self) -> &[String] {
        &self.accounts
    }

    /// Most recently used account.
    pub fn last_used(&self) -> Option<&str> {
        self.accounts.first().map(String::as_str)
    }

    /// Moves `user` to the front, adding it if unknown.
    pub fn touch(&mut self, user: &str) {
        self.accounts.retain(|a| a != user);
        self.accounts.insert(0, user.to_string());
    }

    /// Removes `user`; returns whether it was present.
    pub fn remove(&mut self, user: &str) -> bool {
        let before = self.accounts.len();
        self.accounts.retain(|a| a != user);
        before != self.accounts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryCredentials(Mutex<HashMap<String, String>>);

    impl CredentialStore for MemoryCredentials {
        fn remember(&self, user: &str, password: &str) -> Result<(), StoreError> {
            self.0.lock().unwrap().insert(user.to_string(), password.to_string());
            Ok(())
        }

        fn recall(&self, user: &str) -> Result<Option<String>, StoreError> {
            Ok(self.0.lock().unwrap().get(user).cloned())
        }

        fn forget(&self, user: &str) -> Result<(), StoreError> {
            self.0.lock().unwrap().remove(user);
            Ok(())
        }
    }

    fn round_trip(store: &dyn CredentialStore) {
        store.remember("alice", "hunter2").unwrap();
        store.remember("alice", "correct horse").unwrap();
        assert_eq!(store.recall("alice").unwrap().as_deref(), Some("correct horse"));
        store.forget("alice").unwrap();
        store.forget("alice").unwrap();
        assert_eq!(store.recall("alice").unwrap(), None);
    }

    #[test]
    fn test_credential_store_contract() {
        round_trip(&MemoryCredentials::default());
    }

    #[test]
    fn test_keychain_service_name() {
        assert_eq!(SystemKeychain::new().service, "schannel");
        assert_eq!(SystemKeychain::with_service("schannel-test").service, "schannel-test");
    }

    #[test]
    fn test_account_list_most_recent_first() {
        let mut accounts = AccountList::default();
        accounts.touch("alice");
        accounts.touch("bob");
        accounts.touch("alice");

        assert_eq!(accounts.names(), ["alice".to_string(), "bob".to_string()]);
        assert_eq!(accounts.last_used(), Some("alice"));

        assert!(accounts.remove("alice"));
        assert!(!accounts.remove("alice"));
        assert_eq!(accounts.last_used(), Some("bob"));
    }

    #[tokio::test]
    async fn test_account_list_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");

        assert!(AccountList::load_from(&path).await.unwrap().names().is_empty());

        let mut accounts = AccountList::default();
        accounts.touch("alice");
        accounts.save_to(&path).await.unwrap();

        let loaded = AccountList::load_from(&path).await.unwrap();
        assert_eq!(loaded, accounts);
    }
}
