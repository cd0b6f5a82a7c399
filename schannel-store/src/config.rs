//! User configuration.

use schannel_fetch::{DEFAULT_SITE_URL, SiteUrls, parse_proxy_url};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_config_path, load_json_if_exists, save_json};

// ============================================================================
// Config Path
// ============================================================================

/// A path from the config file: absolute, or starting with `~`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfigPath(String);

impl ConfigPath {
    /// Validates a path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotAbsolute` for relative paths.
    pub fn new(path: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.into();
        if path.starts_with('~') || Path::new(&path).is_absolute() {
            Ok(Self(path))
        } else {
            Err(StoreError::NotAbsolute(path))
        }
    }

    /// The path as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expands a leading `~` against the user's home directory.
    pub fn expand(&self) -> Result<PathBuf, StoreError> {
        self.expand_with_home(dirs::home_dir().as_deref())
    }

    /// Expands a leading `~` against `home`.
    pub fn expand_with_home(&self, home: Option<&Path>) -> Result<PathBuf, StoreError> {
        match self.0.strip_prefix('~') {
            None => Ok(PathBuf::from(&self.0)),
            Some(rest) => {
                let home = home.ok_or(StoreError::HomeNotFound)?;
                Ok(home.join(rest.trim_start_matches('/')))
            }
        }
    }
}

impl TryFrom<String> for ConfigPath {
    type Error = StoreError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<ConfigPath> for String {
    fn from(path: ConfigPath) -> Self {
        path.0
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reads an optional path where `""` means unset.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<ConfigPath>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => ConfigPath::new(s).map(Some).map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Proxy URL
// ============================================================================

/// Upstream proxy setting: empty for direct, else an http/https/socks5 URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProxyUrl(String);

impl ProxyUrl {
    /// Validates a proxy URL.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidProxy` for malformed URLs and schemes
    /// other than http, https and socks5.
    pub fn new(url: impl Into<String>) -> Result<Self, StoreError> {
        let url = url.into().trim().to_string();
        parse_proxy_url(&url).map_err(|e| StoreError::InvalidProxy(e.to_string()))?;
        Ok(Self(url))
    }

    /// The URL, or `""` for a direct connection.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for a direct connection.
    pub fn is_direct(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<String> for ProxyUrl {
    type Error = StoreError;

    fn try_from(url: String) -> Result<Self, Self::Error> {
        Self::new(url)
    }
}

impl From<ProxyUrl> for String {
    fn from(url: ProxyUrl) -> Self {
        url.0
    }
}

// ============================================================================
// User Config
// ============================================================================

/// Settings keys accepted by [`UserConfig::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "proxy_url",
    "site_url",
    "log_file",
    "node_config_path",
    "client_config_path",
    "client_bin",
];

/// Persistent user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Upstream proxy for all site traffic.
    pub proxy_url: ProxyUrl,
    /// Root URL of the account site.
    pub site_url: String,
    /// Extra log file, appended to.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub log_file: Option<ConfigPath>,
    /// Where `nodes --export` writes the node list.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub node_config_path: Option<ConfigPath>,
    /// Proxy client configuration file.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub client_config_path: Option<ConfigPath>,
    /// Proxy client executable.
    #[serde(deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub client_bin: Option<ConfigPath>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            proxy_url: ProxyUrl::default(),
            site_url: DEFAULT_SITE_URL.to_string(),
            log_file: None,
            node_config_path: None,
            client_config_path: None,
            client_bin: None,
        }
    }
}

impl UserConfig {
    /// Loads `config.json` from the default config directory.
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&default_config_path()).await
    }

    /// Loads a config file; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or holds an
    /// invalid value (bad proxy URL, relative path).
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        match load_json_if_exists(path).await? {
            Some(config) => {
                debug!(path = %path.display(), "Loaded configuration");
                Ok(config)
            }
            None => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Saves to the default config path.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.save_to(&default_config_path()).await
    }

    /// Saves to a specific path.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Site endpoints for `site_url`.
    pub fn site(&self) -> Result<SiteUrls, StoreError> {
        SiteUrls::new(&self.site_url).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Returns a setting as text; unset paths are `""`.
    pub fn get(&self, key: &str) -> Result<String, StoreError> {
        let path = |p: &Option<ConfigPath>| p.as_ref().map(ToString::to_string).unwrap_or_default();
        Ok(match key {
            "proxy_url" => self.proxy_url.as_str().to_string(),
            "site_url" => self.site_url.clone(),
            "log_file" => path(&self.log_file),
            "node_config_path" => path(&self.node_config_path),
            "client_config_path" => path(&self.client_config_path),
            "client_bin" => path(&self.client_bin),
            _ => return Err(unknown_key(key)),
        })
    }

    /// Updates a setting from text; `""` clears a path.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys and invalid values. The config is
    /// left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = |v: &str| {
            if v.is_empty() {
                Ok(None)
            } else {
                ConfigPath::new(v).map(Some)
            }
        };
        match key {
            "proxy_url" => self.proxy_url = ProxyUrl::new(value)?,
            "site_url" => {
                SiteUrls::new(value).map_err(|e| StoreError::Config(e.to_string()))?;
                self.site_url = value.to_string();
            }
            "log_file" => self.log_file = path(value)?,
            "node_config_path" => self.node_config_path = path(value)?,
            "client_config_path" => self.client_config_path = path(value)?,
            "client_bin" => self.client_bin = path(value)?,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> StoreError {
    StoreError::Config(format!(
        "unknown setting {key:?}, expected one of: {}",
        CONFIG_KEYS.join(", ")
    ))
}
