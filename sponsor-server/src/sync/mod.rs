//! Participant synchronization from the external registration and resume
//! stores into the local `participants` table.

pub mod augmenter;
mod error;
pub mod fetcher;
mod record;
pub mod scheduler;
pub mod scheme;
pub mod source;

pub use augmenter::ResumeAugmenter;
pub use error::SyncError;
pub use fetcher::SourceFetcher;
pub use record::ExternalRecord;
pub use scheduler::{
    CycleOutcome, CycleReport, IntervalTicker, SyncHandle, SyncScheduler, SyncSettings,
    SyncState, SyncStatus, Ticker,
};
pub use scheme::validate_scheme;
pub use source::{DocumentSession, DocumentStore, DocumentStream, MongoDocumentStore, StoreError};
