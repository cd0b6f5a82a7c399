//! File persistence helpers.
//!
//! JSON files under the schannel config and cache directories, written
//! atomically with owner-only permissions.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::StoreError;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/schannel`
/// - Linux: `~/.config/schannel`
/// - Windows: `%APPDATA%\schannel`
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support").join("schannel"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::config_dir()
            .map(|c| c.join("schannel"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Returns the default cache directory.
///
/// - macOS: `~/Library/Caches/schannel`
/// - Linux: `~/.cache/schannel`
/// - Windows: `%LOCALAPPDATA%\schannel`
pub fn default_cache_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Caches").join("schannel"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|c| c.join("schannel"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// `config.json` in the config directory.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// `accounts.json` in the config directory.
pub fn default_accounts_path() -> PathBuf {
    default_config_dir().join("accounts.json")
}

/// `history.json` in the cache directory.
pub fn default_history_path() -> PathBuf {
    default_cache_dir().join("history.json")
}

/// Directory holding one saved login session per user.
pub fn default_sessions_dir() -> PathBuf {
    default_cache_dir().join("sessions")
}

// ============================================================================
// Permissions
// ============================================================================

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(mode);
    tokio::fs::set_permissions(path, perms).await?;

    debug!(path = %path.display(), mode = format!("{mode:o}"), "Set permissions");
    Ok(())
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}

async fn set_restrictive_permissions(path: &Path) -> Result<(), StoreError> {
    set_mode(path, 0o600).await
}

async fn set_restrictive_dir_permissions(path: &Path) -> Result<(), StoreError> {
    set_mode(path, 0o700).await
}

// ============================================================================
// File Operations
// ============================================================================

async fn create_secure_parent_dirs(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent).await?;
        }
    }
    Ok(())
}

/// Saves data to a JSON file.
///
/// Parent directories are created (0700 on Unix), the file is written to a
/// temp file then renamed into place, and left readable by the owner only.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    create_secure_parent_dirs(path).await?;

    let json = serde_json::to_string_pretty(data)?;

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;
    set_restrictive_permissions(&temp_path).await?;
    tokio::fs::rename(&temp_path, path).await?;

    debug!(path = %path.display(), "JSON file saved");
    Ok(())
}

/// Loads data from a JSON file.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    debug!(path = %path.display(), "Loading JSON file");

    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    Ok(data)
}

/// Loads a JSON file, returning `None` if it does not exist.
///
/// Unreadable or malformed files are still errors.
pub async fn load_json_if_exists<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match load_json(path).await {
        Ok(data) => Ok(Some(data)),
        Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Loads data from a JSON file, returning default if missing or invalid.
pub async fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match load_json(path).await {
        Ok(data) => data,
        Err(e) => {
            if !matches!(e, StoreError::Io(_)) {
                warn!(path = %path.display(), error = %e, "Failed to load, using defaults");
            }
            T::default()
        }
    }
}

/// Removes a file; a missing file is not an error.
pub async fn remove_file(path: &Path) -> Result<(), StoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Removed file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Ensures a directory exists, creating it with owner-only permissions.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "Creating directory");
        tokio::fs::create_dir_all(path).await?;
        set_restrictive_dir_permissions(path).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert!(default_config_path().ends_with("config.json"));
        assert!(default_accounts_path().ends_with("accounts.json"));
        assert!(default_history_path().ends_with("history.json"));
        assert!(default_sessions_dir().ends_with("sessions"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.json");

        save_json(&test_file, &serde_json::json!({})).await.unwrap();

        let mode = tokio::fs::metadata(&test_file).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "File should have 0600 permissions");
    }
}
