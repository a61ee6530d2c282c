use chrono::{DateTime, Utc};
use sqlx::Row;

use proposer_core::domain::client::{
    ClientFacts, ClientFilter, ClientId, ClientRecord, ClientStatus, NewClient, Region,
};
use proposer_core::domain::segment::SegmentId;

use super::{
    decode, from_sql_integer, parse_timestamp, to_sql_integer, ClientRepository, RepositoryError,
    StatusChange,
};
use crate::DbPool;

const CLIENT_COLUMNS: &str = "id, company_name, contact_name, contact_role, email, phone,
    employee_count, region, segment, pain_points_json, requirements_json, status, notes,
    created_at, updated_at";

pub struct SqlClientRepository {
    pool: DbPool,
}

impl SqlClientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_client(row: &sqlx::sqlite::SqliteRow) -> Result<ClientRecord, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(decode)?;
    let employee_count: i64 = row.try_get("employee_count").map_err(decode)?;
    let region: String = row.try_get("region").map_err(decode)?;
    let segment: String = row.try_get("segment").map_err(decode)?;
    let status: String = row.try_get("status").map_err(decode)?;
    let pain_points_json: String = row.try_get("pain_points_json").map_err(decode)?;
    let requirements_json: String = row.try_get("requirements_json").map_err(decode)?;
    let created_at: String = row.try_get("created_at").map_err(decode)?;
    let updated_at: String = row.try_get("updated_at").map_err(decode)?;

    let facts = ClientFacts {
        company_name: row.try_get("company_name").map_err(decode)?,
        contact_name: row.try_get("contact_name").map_err(decode)?,
        contact_role: row.try_get("contact_role").map_err(decode)?,
        employee_count: from_sql_integer("employee_count", employee_count)?,
        region: Region::parse(&region).map_err(decode)?,
        segment: SegmentId::parse(&segment).map_err(decode)?,
        pain_points: serde_json::from_str(&pain_points_json).map_err(decode)?,
        requirements: serde_json::from_str(&requirements_json).map_err(decode)?,
    };

    Ok(ClientRecord {
        id: ClientId(id),
        facts,
        email: row.try_get("email").map_err(decode)?,
        phone: row.try_get("phone").map_err(decode)?,
        status: ClientStatus::parse(&status).map_err(decode)?,
        notes: row.try_get("notes").map_err(decode)?,
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

#[async_trait::async_trait]
impl ClientRepository for SqlClientRepository {
    async fn insert(
        &self,
        client: NewClient,
        now: DateTime<Utc>,
    ) -> Result<ClientRecord, RepositoryError> {
        let facts = &client.facts;
        let employee_count = to_sql_integer("employee_count", facts.employee_count)?;
        let pain_points_json = serde_json::to_string(&facts.pain_points)
            .map_err(|error| RepositoryError::Encode(error.to_string()))?;
        let requirements_json = serde_json::to_string(&facts.requirements)
            .map_err(|error| RepositoryError::Encode(error.to_string()))?;
        let timestamp = now.to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO client (company_name, contact_name, contact_role, email, phone,
                                 employee_count, region, segment, pain_points_json,
                                 requirements_json, status, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)",
        )
        .bind(&facts.company_name)
        .bind(&facts.contact_name)
        .bind(&facts.contact_role)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(employee_count)
        .bind(facts.region.as_str())
        .bind(facts.segment.as_str())
        .bind(pain_points_json)
        .bind(requirements_json)
        .bind(client.status.as_str())
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(&self.pool)
        .await?;

        Ok(ClientRecord::from_new(ClientId(result.last_insert_rowid()), client, now))
    }

    async fn find_by_id(&self, id: ClientId) -> Result<Option<ClientRecord>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {CLIENT_COLUMNS} FROM client WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_client).transpose()
    }

    async fn list(&self, filter: &ClientFilter) -> Result<Vec<ClientRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client
             WHERE (?1 IS NULL OR segment = ?1)
               AND (?2 IS NULL OR status = ?2)
               AND (?3 IS NULL OR region = ?3)
             ORDER BY id ASC"
        ))
        .bind(filter.segment.map(|segment| segment.as_str()))
        .bind(filter.status.map(|status| status.as_str()))
        .bind(filter.region.map(|region| region.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_client).collect()
    }

    async fn update_status(
        &self,
        id: ClientId,
        status: ClientStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<StatusChange>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> = sqlx::query("SELECT status FROM client WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| row.try_get("status"))
            .transpose()
            .map_err(decode)?;
        let Some(previous) = previous else {
            return Ok(None);
        };
        let previous_status = ClientStatus::parse(&previous).map_err(decode)?;

        sqlx::query(
            "UPDATE client SET status = ?, notes = COALESCE(?, notes), updated_at = ? WHERE id = ?",
        )
        .bind(status.as_str())
        .bind(&note)
        .bind(now.to_rfc3339())
        .bind(id.0)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(&format!("SELECT {CLIENT_COLUMNS} FROM client WHERE id = ?"))
            .bind(id.0)
            .fetch_one(&mut *tx)
            .await?;
        let client = row_to_client(&row)?;
        tx.commit().await?;

        Ok(Some(StatusChange { previous_status, client }))
    }
}
