//! Command-line arguments
//!
//! Every option can also come from a `SPONSOR_*` environment variable; clap
//! gives the flag priority over the variable. Unset options fall through to
//! the TOML file and then to compiled defaults.

use std::path::PathBuf;

use clap::Parser;
use sponsor_common::config::{default_config_path, TomlConfig};

/// Command-line arguments for sponsor-server
#[derive(Parser, Debug)]
#[command(name = "sponsor-server")]
#[command(about = "Participant sync and sponsor API for the hackathon")]
#[command(version)]
pub struct Args {
    /// TOML config file
    #[arg(short, long, env = "SPONSOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address for the HTTP server
    #[arg(long, env = "SPONSOR_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Local participant database
    #[arg(long, env = "SPONSOR_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Registration store address
    #[arg(long, env = "SPONSOR_QUILL_DB_URI")]
    pub quill_db_uri: Option<String>,

    /// Resume store address
    #[arg(long, env = "SPONSOR_RESUMES_DB_URI")]
    pub resumes_db_uri: Option<String>,

    /// Seconds between sync cycles
    #[arg(long, env = "SPONSOR_SYNC_INTERVAL_SECS")]
    pub sync_interval_secs: Option<u64>,

    /// Maximum simultaneous resume downloads
    #[arg(long, env = "SPONSOR_DOWNLOAD_CONCURRENCY")]
    pub download_concurrency: Option<usize>,

    /// Deadline for building a resume archive, in seconds
    #[arg(long, env = "SPONSOR_ARCHIVE_TIMEOUT_SECS")]
    pub archive_timeout_secs: Option<u64>,

    /// Debug logging
    #[arg(short, long, env = "SPONSOR_DEBUG")]
    pub debug: bool,
}

impl Args {
    /// Config file to read, falling back to the per-user default location
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }

    /// The CLI/ENV configuration layer
    pub fn to_layer(&self) -> TomlConfig {
        TomlConfig {
            listen_addr: self.listen_addr.clone(),
            database_path: self.db_path.clone(),
            quill_db_uri: self.quill_db_uri.clone(),
            resumes_db_uri: self.resumes_db_uri.clone(),
            sync_interval_secs: self.sync_interval_secs,
            download_concurrency: self.download_concurrency,
            archive_timeout_secs: self.archive_timeout_secs,
            ..TomlConfig::default()
        }
    }
}
