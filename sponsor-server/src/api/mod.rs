//! HTTP API handlers for sponsor-server

pub mod health;
pub mod participants;
pub mod sync_status;

pub use health::health_routes;
pub use participants::{get_participants, get_resume_archive, RESUME_FAILURES_HEADER};
pub use sync_status::get_sync_status;
