//! Database Test Utilities

use sponsor_common::db::{init_database, Participant};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create a temporary participant database
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("Should create temp dir");
    let db_path = temp_dir.path().join("sponsor_test.db");
    let pool = init_database(&db_path)
        .await
        .expect("Should initialize test database");
    (temp_dir, pool)
}

/// Current participant rows, ordered by name then id
pub async fn participant_rows(pool: &SqlitePool) -> Vec<Participant> {
    sponsor_server::db::list_participants(pool)
        .await
        .expect("Should list participants")
}
