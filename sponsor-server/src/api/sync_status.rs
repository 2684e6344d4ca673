use axum::{extract::State, Json};

use crate::sync::SyncStatus;
use crate::AppState;

/// GET /api/sync/status
///
/// Latest snapshot published by the sync scheduler.
pub async fn get_sync_status(State(state): State<AppState>) -> Json<SyncStatus> {
    Json(state.sync_status.borrow().clone())
}
