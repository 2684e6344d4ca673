//! Registration store fetch
//!
//! Pulls every participant document from the registration store and
//! decodes it. The whole fetch (connect + full read) runs under one fixed
//! deadline, and a single bad document fails the fetch: nothing partial is
//! ever handed to the writer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use sponsor_common::config::CollectionRef;
use sponsor_common::time::elapsed_ms;
use tracing::{debug, error};

use super::scheme::redact_address;
use super::source::{DocumentStore, StoreError};
use super::{ExternalRecord, SyncError};

/// Deadline for connecting to and reading the registration store
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches participant records from the registration store
pub struct SourceFetcher {
    store: Arc<dyn DocumentStore>,
    address: String,
    collection: CollectionRef,
    timeout: Duration,
}

impl SourceFetcher {
    pub fn new(store: Arc<dyn DocumentStore>, address: String, collection: CollectionRef) -> Self {
        Self {
            store,
            address,
            collection,
            timeout: FETCH_TIMEOUT,
        }
    }

    /// Override the fetch deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch and decode every participant record.
    ///
    /// No retry happens here; the scheduler's next cycle is the retry.
    pub async fn fetch(&self) -> Result<Vec<ExternalRecord>, SyncError> {
        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.fetch_all())
            .await
            .unwrap_or(Err(SyncError::Timeout {
                operation: "participant fetch",
                timeout: self.timeout,
            }));

        if let Ok(records) = &result {
            debug!(
                collection = %self.collection,
                records = records.len(),
                elapsed_ms = elapsed_ms(start),
                "Fetched participant records"
            );
        }
        result
    }

    async fn fetch_all(&self) -> Result<Vec<ExternalRecord>, SyncError> {
        debug!(address = %redact_address(&self.address), "Connecting to registration store");
        let session = self
            .store
            .connect(&self.address, self.timeout)
            .await
            .map_err(|e| self.connection_error(e))?;

        let mut documents = session
            .stream_all(&self.collection)
            .await
            .map_err(|e| self.query_error(e))?;

        let mut records = Vec::new();
        while let Some(document) = documents.next().await {
            let document = document.map_err(|e| self.query_error(e))?;
            match ExternalRecord::from_document(document) {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!(
                        collection = %self.collection,
                        decoded = records.len(),
                        error = %e,
                        "Discarding fetch: participant document failed to decode"
                    );
                    return Err(e);
                }
            }
        }

        Ok(records)
    }

    fn connection_error(&self, e: StoreError) -> SyncError {
        SyncError::Connection {
            address: redact_address(&self.address),
            reason: e.to_string(),
        }
    }

    fn query_error(&self, e: StoreError) -> SyncError {
        SyncError::Query {
            collection: self.collection.to_string(),
            reason: e.to_string(),
        }
    }
}
