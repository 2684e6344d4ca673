//! sponsor-server library
//!
//! Keeps a local SQLite copy of hackathon participants synced from the
//! registration and resume stores, and serves it to sponsors over HTTP.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod archive;
pub mod cli;
pub mod db;
pub mod error;
pub mod sync;

use archive::ResumeArchiver;
use sync::SyncStatus;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Local participant store
    pub db: SqlitePool,
    pub archiver: Arc<ResumeArchiver>,
    /// Latest scheduler status
    pub sync_status: watch::Receiver<SyncStatus>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        archiver: ResumeArchiver,
        sync_status: watch::Receiver<SyncStatus>,
    ) -> Self {
        Self {
            db,
            archiver: Arc::new(archiver),
            sync_status,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let api = Router::new()
        .route("/api/participants", get(api::get_participants))
        .route("/api/participants/resumes", get(api::get_resume_archive))
        .route("/api/sync/status", get(api::get_sync_status));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
