//! Participant endpoints
//!
//! Both read the local participant table only; the external stores are
//! never touched on the request path.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue},
    response::Response,
    Json,
};
use serde::Serialize;
use sponsor_common::db::Participant;
use tracing::info;

use crate::db::list_participants;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Header carrying the number of resumes left out of the archive
pub const RESUME_FAILURES_HEADER: &str = "x-resume-failures";

/// Response for GET /api/participants
#[derive(Debug, Serialize)]
pub struct ParticipantList {
    pub count: usize,
    pub participants: Vec<Participant>,
}

/// GET /api/participants
pub async fn get_participants(State(state): State<AppState>) -> ApiResult<Json<ParticipantList>> {
    let participants = list_participants(&state.db).await?;
    Ok(Json(ParticipantList {
        count: participants.len(),
        participants,
    }))
}

/// GET /api/participants/resumes
///
/// Streams back a tar of every downloadable resume. Individual download
/// failures do not fail the request; their count is reported in
/// `x-resume-failures`.
pub async fn get_resume_archive(State(state): State<AppState>) -> ApiResult<Response> {
    let participants = list_participants(&state.db).await?;
    let archive = state.archiver.archive(&participants).await?;

    info!(
        entries = archive.entries.len(),
        failures = archive.failures.len(),
        "Serving resume archive"
    );

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/x-tar"))
        .header(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment; filename=\"resumes.tar\""),
        )
        .header(RESUME_FAILURES_HEADER, archive.failures.len())
        .body(Body::from(archive.bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
