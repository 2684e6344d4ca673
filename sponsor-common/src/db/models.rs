//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A hackathon participant as persisted in the `participants` table.
///
/// Rows are only ever written by the sync pipeline, as a full replacement
/// of the previous snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Participant {
    /// External identifier (hex ObjectId from the registration store)
    pub id: String,
    pub name: String,
    pub email: String,
    pub university: String,
    pub major: String,
    pub grad_year: i64,
    pub github: String,
    pub linkedin: String,
    /// Resume download URL, empty when no resume was found
    pub resume_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Participant {
    /// True when the participant has a resume to download
    pub fn has_resume(&self) -> bool {
        !self.resume_url.is_empty()
    }
}
