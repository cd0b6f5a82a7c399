// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # schannel Store
//!
//! State kept between and during client runs.
//!
//! - **DataBridge**: TTL cache of the account pages, one refresh at a time
//! - **UserConfig**: proxy, site and path settings in `config.json`
//! - **HistoryStore**: per-day usage records
//! - **SystemKeychain** / **AccountList**: remembered logins
//! - **SessionStore**: saved login cookies
//!
//! ## Usage
//!
//! ```ignore
//! use schannel_store::{DataBridge, UserConfig};
//!
//! let config = UserConfig::load().await?;
//! let bridge = DataBridge::new(cookies, config.proxy_url.as_str(), config.site()?)?;
//!
//! for service in bridge.service_infos().await {
//!     println!("{}", service.name);
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod history;
pub mod keychain;
pub mod persistence;
pub mod sessions;

pub use bridge::{CACHE_TTL, DataBridge};
pub use config::{CONFIG_KEYS, ConfigPath, ProxyUrl, UserConfig};
pub use error::StoreError;
pub use history::{HistoryStore, RECENT_DAYS, UsageHistory};
pub use keychain::{AccountList, CredentialStore, SystemKeychain};
pub use persistence::{
    default_cache_dir, default_config_dir, default_config_path, load_json, load_json_or_default,
    save_json,
};
pub use sessions::{SavedSession, SessionStore};

#[cfg(test)]
mod persistence_tests;
