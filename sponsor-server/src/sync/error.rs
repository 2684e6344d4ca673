//! Sync pipeline error types

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the participant sync pipeline.
///
/// Only the address validation variants ever reach a caller (from
/// `SyncScheduler::start`). Everything else is cycle-local and is logged.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Address uses a scheme other than the document-store scheme
    #[error("unsupported database scheme '{scheme}' in {address} (expected '{expected}')")]
    UnsupportedScheme {
        address: String,
        scheme: String,
        expected: &'static str,
    },

    /// Address has a scheme but cannot be parsed
    #[error("invalid source address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Store unreachable or connection refused
    #[error("connection to {address} failed: {reason}")]
    Connection { address: String, reason: String },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Query or cursor failure on the registration store
    #[error("query on {collection} failed: {reason}")]
    Query { collection: String, reason: String },

    /// A registration document could not be decoded
    #[error("failed to decode participant record {context}: {reason}")]
    Decode { context: String, reason: String },

    /// Resume lookup failed for a reason other than "not found"
    #[error("resume lookup for participant {participant_id} failed: {reason}")]
    Lookup {
        participant_id: String,
        reason: String,
    },

    #[error("graduation year '{value}' of participant {participant_id} is not a number")]
    Conversion {
        participant_id: String,
        value: String,
    },

    #[error("failed to persist participants: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("sync cycle cancelled")]
    Cancelled,
}

impl SyncError {
    /// True for configuration errors that no retry will fix
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::UnsupportedScheme { .. } | SyncError::InvalidAddress { .. }
        )
    }
}
