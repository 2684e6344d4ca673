//! Resume augmentation
//!
//! Looks up each participant's resume link in the resume store, keyed by
//! the participant id. A missing resume is normal; any other lookup failure
//! aborts augmentation for the cycle.

use std::sync::Arc;
use std::time::Duration;

use mongodb::bson::{Bson, Document};
use sponsor_common::config::CollectionRef;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::fetcher::FETCH_TIMEOUT;
use super::scheme::redact_address;
use super::source::DocumentStore;
use super::{ExternalRecord, SyncError};

/// Field of a resume document holding the participant id
pub const RESUME_OWNER_FIELD: &str = "userid";
/// Field of a resume document holding the download URL
pub const RESUME_URL_FIELD: &str = "url";

/// Attaches resume links to fetched participant records
pub struct ResumeAugmenter {
    store: Arc<dyn DocumentStore>,
    address: String,
    collection: CollectionRef,
    connect_timeout: Duration,
}

impl ResumeAugmenter {
    pub fn new(store: Arc<dyn DocumentStore>, address: String, collection: CollectionRef) -> Self {
        Self {
            store,
            address,
            collection,
            connect_timeout: FETCH_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Attach resume URLs to `records`.
    ///
    /// Only the connection is deadline-bound; lookups run until done or
    /// until `cancel` fires. Records without a name are skipped.
    pub async fn augment(
        &self,
        mut records: Vec<ExternalRecord>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExternalRecord>, SyncError> {
        debug!(address = %redact_address(&self.address), "Connecting to resume store");
        let session = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SyncError::Cancelled),
            connected = tokio::time::timeout(
                self.connect_timeout,
                self.store.connect(&self.address, self.connect_timeout),
            ) => match connected {
                Ok(Ok(session)) => session,
                Ok(Err(e)) => {
                    return Err(SyncError::Connection {
                        address: redact_address(&self.address),
                        reason: e.to_string(),
                    })
                }
                Err(_) => {
                    return Err(SyncError::Timeout {
                        operation: "resume store connect",
                        timeout: self.connect_timeout,
                    })
                }
            },
        };

        let mut attached = 0usize;
        for record in records.iter_mut().filter(|r| !r.name.is_empty()) {
            let found = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                found = session.find_one(&self.collection, RESUME_OWNER_FIELD, &record.id) => found,
            };

            let document = found.map_err(|e| SyncError::Lookup {
                participant_id: record.id.clone(),
                reason: e.to_string(),
            })?;

            if let Some(url) = document.as_ref().and_then(|d| resume_url(d, &record.id)) {
                record.resume_url = Some(url);
                attached += 1;
            }
        }

        debug!(
            collection = %self.collection,
            records = records.len(),
            resumes = attached,
            "Resume augmentation complete"
        );
        Ok(records)
    }
}

fn resume_url(document: &Document, participant_id: &str) -> Option<String> {
    match document.get(RESUME_URL_FIELD) {
        Some(Bson::String(url)) if !url.is_empty() => Some(url.clone()),
        Some(Bson::String(_)) | None | Some(Bson::Null) => None,
        Some(other) => {
            warn!(
                participant_id,
                value_type = ?other.element_type(),
                "Ignoring resume document with non-string url"
            );
            None
        }
    }
}
