use sponsor_common::db::Participant;
use sqlx::SqlitePool;
use tracing::debug;

use crate::sync::{ExternalRecord, SyncError};

/// List every synced participant
pub async fn list_participants(pool: &SqlitePool) -> sqlx::Result<Vec<Participant>> {
    sqlx::query_as::<_, Participant>(
        r#"
        SELECT id, name, email, university, major, grad_year, github, linkedin,
               resume_url, created_at, updated_at
        FROM participants
        ORDER BY name, id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Parse the free-text graduation year. Blank means unknown (0).
pub fn parse_grad_year(participant_id: &str, value: &str) -> Result<i64, SyncError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse::<i64>().map_err(|_| SyncError::Conversion {
        participant_id: participant_id.to_string(),
        value: value.to_string(),
    })
}

/// Replace the whole participant table with `records`.
///
/// Graduation years are converted before the table is touched, and the
/// delete and all inserts share one transaction, so any failure leaves the
/// previous snapshot in place.
pub async fn replace_participants(
    pool: &SqlitePool,
    records: &[ExternalRecord],
) -> Result<usize, SyncError> {
    let grad_years = records
        .iter()
        .map(|r| parse_grad_year(&r.id, &r.grad_year))
        .collect::<Result<Vec<_>, _>>()?;

    let synced_at = sponsor_common::time::now();
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM participants")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    for (record, grad_year) in records.iter().zip(grad_years) {
        sqlx::query(
            r#"
            INSERT INTO participants
                (id, name, email, university, major, grad_year, github, linkedin,
                 resume_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.school)
        .bind(&record.major)
        .bind(grad_year)
        .bind(&record.github)
        .bind(&record.linkedin)
        .bind(record.resume_url.as_deref().unwrap_or_default())
        .bind(synced_at)
        .bind(synced_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    debug!(
        deleted,
        inserted = records.len(),
        "Replaced participant table"
    );
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grad_year() {
        assert_eq!(parse_grad_year("p1", "2021").unwrap(), 2021);
        assert_eq!(parse_grad_year("p1", " 2022 ").unwrap(), 2022);
        assert_eq!(parse_grad_year("p1", "").unwrap(), 0);
        assert_eq!(parse_grad_year("p1", "   ").unwrap(), 0);
    }

    #[test]
    fn test_parse_grad_year_rejects_text() {
        match parse_grad_year("p7", "Spring 2021") {
            Err(SyncError::Conversion { participant_id, value }) => {
                assert_eq!(participant_id, "p7");
                assert_eq!(value, "Spring 2021");
            }
            other => panic!("Expected conversion error, got {:?}", other),
        }
    }
}
