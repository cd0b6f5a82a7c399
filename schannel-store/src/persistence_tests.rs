//! Persistence round-trip and edge case tests.
//!
//! Tests file I/O operations, JSON persistence, and config round-trip.

use std::path::PathBuf;
use tempfile::TempDir;

use crate::config::{ConfigPath, ProxyUrl, UserConfig};
use crate::error::StoreError;
use crate::persistence::{ensure_dir, load_json, load_json_if_exists, load_json_or_default, remove_file, save_json};

// ============================================================================
// JSON Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let nested_path = temp_dir.path().join("deeply").join("nested").join("test.json");

    save_json(&nested_path, &serde_json::json!({"key": "value"})).await.unwrap();

    assert!(nested_path.exists());
}

#[tokio::test]
async fn test_load_nonexistent_file() {
    let file_path = PathBuf::from("/nonexistent/path/config.json");

    let result: Result<UserConfig, _> = load_json(&file_path).await;
    assert!(matches!(result, Err(StoreError::Io(_))));

    let missing: Option<UserConfig> = load_json_if_exists(&file_path).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_load_if_exists_reports_malformed_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    let result: Result<Option<UserConfig>, _> = load_json_if_exists(&path).await;
    assert!(matches!(result, Err(StoreError::Serialization(_))));

    let fallback: UserConfig = load_json_or_default(&path).await;
    assert_eq!(fallback, UserConfig::default());
}

#[tokio::test]
async fn test_ensure_dir_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let dir_path = temp_dir.path().join("test_dir");

    ensure_dir(&dir_path).await.unwrap();
    ensure_dir(&dir_path).await.unwrap();

    assert!(dir_path.is_dir());
}

#[tokio::test]
async fn test_atomic_write_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    save_json(&path, &UserConfig::default()).await.unwrap();
    save_json(&path, &UserConfig::default()).await.unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_remove_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    remove_file(&temp_dir.path().join("gone.json")).await.unwrap();
}

// ============================================================================
// Config Round-trip Tests
// ============================================================================

#[tokio::test]
async fn test_config_full_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    let config = UserConfig {
        proxy_url: ProxyUrl::new("socks5://127.0.0.1:1080").unwrap(),
        site_url: "https://mirror.example.net/".to_string(),
        log_file: Some(ConfigPath::new("~/.cache/schannel/schannel.log").unwrap()),
        node_config_path: Some(ConfigPath::new("/etc/ssr/nodes.json").unwrap()),
        client_config_path: None,
        client_bin: Some(ConfigPath::new("/usr/local/bin/ssr-local").unwrap()),
    };

    config.save_to(&path).await.unwrap();
    let loaded = UserConfig::load_from(&path).await.unwrap();

    assert_eq!(loaded, config);
}

#[tokio::test]
async fn test_config_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let loaded = UserConfig::load_from(&temp_dir.path().join("config.json")).await.unwrap();
    assert_eq!(loaded, UserConfig::default());
}

#[tokio::test]
async fn test_config_invalid_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    tokio::fs::write(&path, r#"{"client_bin": "bin/ssr-local"}"#).await.unwrap();

    assert!(UserConfig::load_from(&path).await.is_err());
}

#[tokio::test]
async fn test_config_minimal_json_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    tokio::fs::write(&path, r#"{"proxy_url": "http://127.0.0.1:8118"}"#).await.unwrap();

    let loaded = UserConfig::load_from(&path).await.unwrap();
    assert_eq!(loaded.proxy_url.as_str(), "http://127.0.0.1:8118");
    assert_eq!(loaded.site_url, UserConfig::default().site_url);
    assert!(loaded.log_file.is_none());
}

#[tokio::test]
async fn test_config_unknown_fields_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    tokio::fs::write(&path, r#"{"proxy_url": "", "theme": "dark"}"#).await.unwrap();

    assert!(UserConfig::load_from(&path).await.is_ok());
}

#[tokio::test]
async fn test_unset_paths_not_written() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    UserConfig::default().save_to(&path).await.unwrap();
    let text = tokio::fs::read_to_string(&path).await.unwrap();

    assert!(text.contains("proxy_url"));
    assert!(!text.contains("client_bin"));
}
