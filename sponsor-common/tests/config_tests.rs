//! Configuration loading and layer resolution
//!
//! Covers:
//! - Missing TOML files fall back to defaults without error
//! - Layer priority (higher layer wins, unset fields fall through)
//! - Validation of zero-valued intervals and pool sizes

use sponsor_common::config::{
    defaults, load_toml_config, write_toml_config, CollectionRef, ServerConfig, TomlConfig,
};
use sponsor_common::Error;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_missing_config_file_returns_empty_layer() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    let layer = load_toml_config(&path).expect("Missing file should not be an error");
    assert_eq!(layer, TomlConfig::default());
}

#[test]
fn test_defaults_when_no_layers_set() {
    let config = ServerConfig::resolve(TomlConfig::default()).unwrap();

    assert_eq!(config.listen_addr, defaults::LISTEN_ADDR);
    assert_eq!(config.quill_db_uri, defaults::QUILL_DB_URI);
    assert_eq!(config.resumes_db_uri, defaults::RESUMES_DB_URI);
    assert_eq!(config.sync_interval, Duration::from_secs(60));
    assert_eq!(config.quill_users, CollectionRef::new("quill", "users"));
    assert_eq!(config.resumes, CollectionRef::new("resumes", "resumes_19"));
    assert_eq!(config.download_concurrency, defaults::DOWNLOAD_CONCURRENCY);
    assert_eq!(config.archive_timeout, Duration::from_secs(120));
}

#[test]
fn test_toml_round_trip_through_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("sponsor-server.toml");

    let written = TomlConfig {
        quill_db_uri: Some("mongodb://registration.internal:27017/quill".to_string()),
        sync_interval_secs: Some(300),
        download_concurrency: Some(2),
        ..TomlConfig::default()
    };
    write_toml_config(&written, &path).unwrap();

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, written);

    let config = ServerConfig::resolve(loaded).unwrap();
    assert_eq!(config.quill_db_uri, "mongodb://registration.internal:27017/quill");
    assert_eq!(config.sync_interval, Duration::from_secs(300));
    assert_eq!(config.download_concurrency, 2);
}

#[test]
fn test_unparseable_toml_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "sync_interval_secs = \"often\"").unwrap();

    match load_toml_config(&path) {
        Err(Error::Config(msg)) => assert!(msg.contains("broken.toml")),
        other => panic!("Expected config error, got {:?}", other),
    }
}

#[test]
fn test_higher_layer_wins_and_unset_fields_fall_through() {
    let cli = TomlConfig {
        listen_addr: Some("0.0.0.0:9000".to_string()),
        ..TomlConfig::default()
    };
    let file = TomlConfig {
        listen_addr: Some("127.0.0.1:7000".to_string()),
        database_path: Some(PathBuf::from("/srv/sponsor/sponsor.db")),
        resumes_collection: Some("resumes_20".to_string()),
        ..TomlConfig::default()
    };

    let config = ServerConfig::resolve(cli.layered_over(file)).unwrap();

    assert_eq!(config.listen_addr, "0.0.0.0:9000");
    assert_eq!(config.database_path, PathBuf::from("/srv/sponsor/sponsor.db"));
    assert_eq!(config.resumes, CollectionRef::new("resumes", "resumes_20"));
}

#[test]
fn test_zero_sync_interval_rejected() {
    let layer = TomlConfig {
        sync_interval_secs: Some(0),
        ..TomlConfig::default()
    };
    assert!(matches!(ServerConfig::resolve(layer), Err(Error::Config(_))));
}

#[test]
fn test_zero_download_concurrency_rejected() {
    let layer = TomlConfig {
        download_concurrency: Some(0),
        ..TomlConfig::default()
    };
    assert!(matches!(ServerConfig::resolve(layer), Err(Error::Config(_))));
}

#[test]
fn test_collection_ref_display() {
    assert_eq!(CollectionRef::new("quill", "users").to_string(), "quill.users");
}
