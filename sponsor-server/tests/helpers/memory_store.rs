//! In-memory document store
//!
//! Stands in for both external stores. Collections are keyed by
//! `database.collection`; the address passed to `connect` is ignored.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use mongodb::bson::{Bson, Document};
use sponsor_common::config::CollectionRef;
use sponsor_server::sync::{DocumentSession, DocumentStore, DocumentStream, StoreError};

#[derive(Default)]
struct StoreState {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    refuse_connections: AtomicBool,
    stall_connections: AtomicBool,
    fail_lookups: AtomicBool,
    stall_lookups: AtomicBool,
    connects: AtomicUsize,
}

/// Shared handle; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    state: Arc<StoreState>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of `collection`
    pub fn set_documents(&self, collection: &CollectionRef, documents: Vec<Document>) {
        self.state
            .collections
            .lock()
            .unwrap()
            .insert(collection.to_string(), documents);
    }

    /// Make `connect` fail with a connection error
    pub fn refuse_connections(&self, refuse: bool) {
        self.state.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    /// Make `connect` never complete
    pub fn stall_connections(&self, stall: bool) {
        self.state.stall_connections.store(stall, Ordering::SeqCst);
    }

    /// Make `find_one` fail with a query error
    pub fn fail_lookups(&self, fail: bool) {
        self.state.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Make `find_one` never complete
    pub fn stall_lookups(&self, stall: bool) {
        self.state.stall_lookups.store(stall, Ordering::SeqCst);
    }

    /// Number of `connect` calls so far
    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn shared(&self) -> Arc<dyn DocumentStore> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn connect(
        &self,
        _address: &str,
        _timeout: Duration,
    ) -> Result<Box<dyn DocumentSession>, StoreError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);

        if self.state.stall_connections.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.state.refuse_connections.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("connection refused".to_string()));
        }

        Ok(Box::new(MemorySession {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemorySession {
    state: Arc<StoreState>,
}

impl MemorySession {
    fn documents(&self, collection: &CollectionRef) -> Vec<Document> {
        self.state
            .collections
            .lock()
            .unwrap()
            .get(&collection.to_string())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentSession for MemorySession {
    async fn stream_all(&self, collection: &CollectionRef) -> Result<DocumentStream, StoreError> {
        let documents = self.documents(collection);
        Ok(stream::iter(documents.into_iter().map(Ok)).boxed())
    }

    async fn find_one(
        &self,
        collection: &CollectionRef,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError> {
        if self.state.stall_lookups.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.state.fail_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Query("lookup failed".to_string()));
        }

        Ok(self
            .documents(collection)
            .into_iter()
            .find(|d| matches!(d.get(field), Some(Bson::String(s)) if s == value)))
    }
}
