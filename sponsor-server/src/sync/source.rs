//! Document store collaborator
//!
//! The sync pipeline only needs three capabilities from the external
//! stores: connect with a deadline, stream every document of a collection,
//! and find one document by field equality. `MongoDocumentStore` provides
//! them over the MongoDB driver; tests substitute an in-memory store.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::Client;
use sponsor_common::config::CollectionRef;
use thiserror::Error;

/// Failures reported by a document store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store could not be reached or refused the session
    #[error("{0}")]
    Connection(String),

    /// A query or cursor read failed
    #[error("{0}")]
    Query(String),
}

/// Stream of documents from one collection
pub type DocumentStream = BoxStream<'static, Result<Document, StoreError>>;

/// Factory for sessions against an external document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a session to `address`, giving up after `timeout`
    async fn connect(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Box<dyn DocumentSession>, StoreError>;
}

/// An open session against one document store
#[async_trait]
pub trait DocumentSession: Send + Sync {
    /// Stream every document in `collection`
    async fn stream_all(&self, collection: &CollectionRef) -> Result<DocumentStream, StoreError>;

    /// Find the first document whose `field` equals `value`
    async fn find_one(
        &self,
        collection: &CollectionRef,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError>;
}

/// MongoDB-backed document store
#[derive(Debug, Default, Clone)]
pub struct MongoDocumentStore;

impl MongoDocumentStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn connect(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<Box<dyn DocumentSession>, StoreError> {
        let mut options = ClientOptions::parse(address)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some("sponsor-server".to_string());

        let client =
            Client::with_options(options).map_err(|e| StoreError::Connection(e.to_string()))?;

        // The driver connects lazily; ping so an unreachable server fails here
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Box::new(MongoSession { client }))
    }
}

struct MongoSession {
    client: Client,
}

impl MongoSession {
    fn collection(&self, collection: &CollectionRef) -> mongodb::Collection<Document> {
        self.client
            .database(&collection.database)
            .collection::<Document>(&collection.collection)
    }
}

#[async_trait]
impl DocumentSession for MongoSession {
    async fn stream_all(&self, collection: &CollectionRef) -> Result<DocumentStream, StoreError> {
        let cursor = self
            .collection(collection)
            .find(None, None)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(cursor
            .map_err(|e| StoreError::Query(e.to_string()))
            .boxed())
    }

    async fn find_one(
        &self,
        collection: &CollectionRef,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, StoreError> {
        let mut filter = Document::new();
        filter.insert(field, value);

        self.collection(collection)
            .find_one(filter, None)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }
}
