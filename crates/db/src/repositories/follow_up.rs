use chrono::{DateTime, Utc};
use sqlx::Row;

use proposer_core::domain::client::ClientId;
use proposer_core::domain::follow_up::{
    FollowUpId, FollowUpKind, FollowUpRecord, FollowUpStatus, NewFollowUp,
};

use super::{decode, parse_timestamp, FollowUpRepository, RepositoryError};
use crate::DbPool;

pub struct SqlFollowUpRepository {
    pool: DbPool,
}

impl SqlFollowUpRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_follow_up(row: &sqlx::sqlite::SqliteRow) -> Result<FollowUpRecord, RepositoryError> {
    let kind: String = row.try_get("kind").map_err(decode)?;
    let status: String = row.try_get("status").map_err(decode)?;
    let scheduled_for: String = row.try_get("scheduled_for").map_err(decode)?;
    let created_at: String = row.try_get("created_at").map_err(decode)?;

    Ok(FollowUpRecord {
        id: FollowUpId(row.try_get("id").map_err(decode)?),
        client_id: ClientId(row.try_get("client_id").map_err(decode)?),
        kind: FollowUpKind::parse(&kind).map_err(decode)?,
        scheduled_for: parse_timestamp("scheduled_for", &scheduled_for)?,
        notes: row.try_get("notes").map_err(decode)?,
        status: FollowUpStatus::parse(&status),
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

#[async_trait::async_trait]
impl FollowUpRepository for SqlFollowUpRepository {
    async fn insert(
        &self,
        follow_up: NewFollowUp,
        now: DateTime<Utc>,
    ) -> Result<FollowUpRecord, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO follow_up (client_id, kind, scheduled_for, notes, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(follow_up.client_id.0)
        .bind(follow_up.kind.as_str())
        .bind(follow_up.scheduled_for.to_rfc3339())
        .bind(&follow_up.notes)
        .bind(FollowUpStatus::Scheduled.as_str())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(FollowUpRecord::from_new(FollowUpId(result.last_insert_rowid()), follow_up, now))
    }

    async fn list_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<FollowUpRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, client_id, kind, scheduled_for, notes, status, created_at
             FROM follow_up WHERE client_id = ? ORDER BY scheduled_for ASC, id ASC",
        )
        .bind(client_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_follow_up).collect()
    }
}
