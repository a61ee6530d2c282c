use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;

use proposer_core::domain::client::ClientId;
use proposer_core::domain::plan::PlanId;
use proposer_core::domain::proposal::{NewProposal, ProposalId, ProposalRecord};

use super::{
    decode, from_sql_integer, parse_timestamp, to_sql_integer, ProposalRepository,
    RepositoryError,
};
use crate::DbPool;

const PROPOSAL_COLUMNS: &str = "id, client_id, plan, unit_count, discount_pct,
    unit_price_after_discount, total_price, validity_days, notes, html, created_at";

pub struct SqlProposalRepository {
    pool: DbPool,
}

impl SqlProposalRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decimal_column(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let raw: String = row.try_get(column).map_err(decode)?;
    Decimal::from_str(&raw)
        .map_err(|error| RepositoryError::Decode(format!("invalid {column} `{raw}`: {error}")))
}

fn row_to_proposal(row: &sqlx::sqlite::SqliteRow) -> Result<ProposalRecord, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(decode)?;
    let client_id: i64 = row.try_get("client_id").map_err(decode)?;
    let plan: String = row.try_get("plan").map_err(decode)?;
    let unit_count: i64 = row.try_get("unit_count").map_err(decode)?;
    let validity_days: i64 = row.try_get("validity_days").map_err(decode)?;
    let created_at: String = row.try_get("created_at").map_err(decode)?;

    Ok(ProposalRecord {
        id: ProposalId(id),
        client_id: ClientId(client_id),
        plan: PlanId::parse(&plan).map_err(decode)?,
        unit_count: from_sql_integer("unit_count", unit_count)?,
        discount_pct: decimal_column(row, "discount_pct")?,
        unit_price_after_discount: decimal_column(row, "unit_price_after_discount")?,
        total_price: decimal_column(row, "total_price")?,
        validity_days: u32::try_from(validity_days)
            .map_err(|_| RepositoryError::Decode(format!("invalid validity_days {validity_days}")))?,
        notes: row.try_get("notes").map_err(decode)?,
        html: row.try_get("html").map_err(decode)?,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

#[async_trait::async_trait]
impl ProposalRepository for SqlProposalRepository {
    async fn insert(
        &self,
        proposal: NewProposal,
        now: DateTime<Utc>,
    ) -> Result<ProposalRecord, RepositoryError> {
        let unit_count = to_sql_integer("unit_count", proposal.unit_count)?;

        let result = sqlx::query(
            "INSERT INTO proposal (client_id, plan, unit_count, discount_pct,
                                   unit_price_after_discount, total_price, validity_days,
                                   notes, html, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(proposal.client_id.0)
        .bind(proposal.plan.as_str())
        .bind(unit_count)
        .bind(proposal.discount_pct.to_string())
        .bind(proposal.unit_price_after_discount.to_string())
        .bind(proposal.total_price.to_string())
        .bind(i64::from(proposal.validity_days))
        .bind(&proposal.notes)
        .bind(&proposal.html)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(ProposalRecord::from_new(ProposalId(result.last_insert_rowid()), proposal, now))
    }

    async fn find_by_id(&self, id: ProposalId) -> Result<Option<ProposalRecord>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PROPOSAL_COLUMNS} FROM proposal WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_proposal).transpose()
    }

    async fn list_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ProposalRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposal WHERE client_id = ? ORDER BY id ASC"
        ))
        .bind(client_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_proposal).collect()
    }
}
