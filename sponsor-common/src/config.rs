//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Command-line and environment handling live in the binary (clap); this
//! module merges whatever layer values are present and validates the result.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Compiled defaults
pub mod defaults {
    pub const LISTEN_ADDR: &str = "127.0.0.1:8080";
    pub const QUILL_DB_URI: &str = "mongodb://localhost:27017/quill";
    pub const RESUMES_DB_URI: &str = "mongodb://localhost:27017/resumes";
    pub const SYNC_INTERVAL_SECS: u64 = 60;
    pub const QUILL_DATABASE: &str = "quill";
    pub const QUILL_COLLECTION: &str = "users";
    pub const RESUMES_DATABASE: &str = "resumes";
    pub const RESUMES_COLLECTION: &str = "resumes_19";
    pub const DOWNLOAD_CONCURRENCY: usize = 8;
    pub const ARCHIVE_TIMEOUT_SECS: u64 = 120;
}

/// One configuration layer. Every field is optional so layers can be merged.
///
/// This is both the on-disk TOML schema and the shape of the CLI/ENV layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub listen_addr: Option<String>,
    pub database_path: Option<PathBuf>,
    pub quill_db_uri: Option<String>,
    pub resumes_db_uri: Option<String>,
    pub sync_interval_secs: Option<u64>,
    pub quill_database: Option<String>,
    pub quill_collection: Option<String>,
    pub resumes_database: Option<String>,
    pub resumes_collection: Option<String>,
    pub download_concurrency: Option<usize>,
    pub archive_timeout_secs: Option<u64>,
}

impl TomlConfig {
    /// Fill every unset field of `self` from `lower`
    pub fn layered_over(self, lower: TomlConfig) -> TomlConfig {
        TomlConfig {
            listen_addr: self.listen_addr.or(lower.listen_addr),
            database_path: self.database_path.or(lower.database_path),
            quill_db_uri: self.quill_db_uri.or(lower.quill_db_uri),
            resumes_db_uri: self.resumes_db_uri.or(lower.resumes_db_uri),
            sync_interval_secs: self.sync_interval_secs.or(lower.sync_interval_secs),
            quill_database: self.quill_database.or(lower.quill_database),
            quill_collection: self.quill_collection.or(lower.quill_collection),
            resumes_database: self.resumes_database.or(lower.resumes_database),
            resumes_collection: self.resumes_collection.or(lower.resumes_collection),
            download_concurrency: self.download_concurrency.or(lower.download_concurrency),
            archive_timeout_secs: self.archive_timeout_secs.or(lower.archive_timeout_secs),
        }
    }
}

/// Location of a collection inside a document store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub database: String,
    pub collection: String,
}

impl CollectionRef {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl std::fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub database_path: PathBuf,
    /// Registration store address (participant records)
    pub quill_db_uri: String,
    /// Resume store address (resume links keyed by participant id)
    pub resumes_db_uri: String,
    pub sync_interval: Duration,
    pub quill_users: CollectionRef,
    pub resumes: CollectionRef,
    pub download_concurrency: usize,
    pub archive_timeout: Duration,
}

impl ServerConfig {
    /// Resolve a merged layer against compiled defaults and validate it
    pub fn resolve(layer: TomlConfig) -> Result<Self> {
        let sync_interval_secs = layer
            .sync_interval_secs
            .unwrap_or(defaults::SYNC_INTERVAL_SECS);
        if sync_interval_secs == 0 {
            return Err(Error::Config(
                "sync_interval_secs must be greater than zero".to_string(),
            ));
        }

        let download_concurrency = layer
            .download_concurrency
            .unwrap_or(defaults::DOWNLOAD_CONCURRENCY);
        if download_concurrency == 0 {
            return Err(Error::Config(
                "download_concurrency must be greater than zero".to_string(),
            ));
        }

        let archive_timeout_secs = layer
            .archive_timeout_secs
            .unwrap_or(defaults::ARCHIVE_TIMEOUT_SECS);
        if archive_timeout_secs == 0 {
            return Err(Error::Config(
                "archive_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            listen_addr: layer
                .listen_addr
                .unwrap_or_else(|| defaults::LISTEN_ADDR.to_string()),
            database_path: layer.database_path.unwrap_or_else(default_database_path),
            quill_db_uri: layer
                .quill_db_uri
                .unwrap_or_else(|| defaults::QUILL_DB_URI.to_string()),
            resumes_db_uri: layer
                .resumes_db_uri
                .unwrap_or_else(|| defaults::RESUMES_DB_URI.to_string()),
            sync_interval: crate::time::secs_to_duration(sync_interval_secs),
            quill_users: CollectionRef::new(
                layer
                    .quill_database
                    .unwrap_or_else(|| defaults::QUILL_DATABASE.to_string()),
                layer
                    .quill_collection
                    .unwrap_or_else(|| defaults::QUILL_COLLECTION.to_string()),
            ),
            resumes: CollectionRef::new(
                layer
                    .resumes_database
                    .unwrap_or_else(|| defaults::RESUMES_DATABASE.to_string()),
                layer
                    .resumes_collection
                    .unwrap_or_else(|| defaults::RESUMES_COLLECTION.to_string()),
            ),
            download_concurrency,
            archive_timeout: crate::time::secs_to_duration(archive_timeout_secs),
        })
    }
}

/// Load a TOML config file.
///
/// A missing file is not an error: a warning is logged and an empty layer
/// is returned so compiled defaults apply. A file that exists but does not
/// parse is an error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write a TOML config file, creating parent directories
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Default TOML config location (`~/.config/sponsor/sponsor-server.toml` on Linux)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("sponsor").join("sponsor-server.toml"))
        .unwrap_or_else(|| PathBuf::from("./sponsor-server.toml"))
}

/// OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("sponsor").join("sponsor.db"))
        .unwrap_or_else(|| PathBuf::from("./sponsor_data/sponsor.db"))
}
