use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use proposer_core::domain::client::{ClientFilter, ClientId, ClientRecord, ClientStatus, NewClient};
use proposer_core::domain::follow_up::{FollowUpRecord, NewFollowUp};
use proposer_core::domain::proposal::{NewProposal, ProposalId, ProposalRecord};

pub mod client;
pub mod follow_up;
pub mod memory;
pub mod proposal;

pub use client::SqlClientRepository;
pub use follow_up::SqlFollowUpRepository;
pub use memory::{InMemoryClientRepository, InMemoryFollowUpRepository, InMemoryProposalRepository};
pub use proposal::SqlProposalRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
}

/// Result of a status transition: the status before the change and the updated record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub previous_status: ClientStatus,
    pub client: ClientRecord,
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn insert(
        &self,
        client: NewClient,
        now: DateTime<Utc>,
    ) -> Result<ClientRecord, RepositoryError>;

    async fn find_by_id(&self, id: ClientId) -> Result<Option<ClientRecord>, RepositoryError>;

    async fn list(&self, filter: &ClientFilter) -> Result<Vec<ClientRecord>, RepositoryError>;

    /// Returns `None` when no client has `id`. A `Some` note replaces the stored notes.
    async fn update_status(
        &self,
        id: ClientId,
        status: ClientStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<StatusChange>, RepositoryError>;
}

#[async_trait]
pub trait ProposalRepository: Send + Sync {
    async fn insert(
        &self,
        proposal: NewProposal,
        now: DateTime<Utc>,
    ) -> Result<ProposalRecord, RepositoryError>;

    async fn find_by_id(&self, id: ProposalId) -> Result<Option<ProposalRecord>, RepositoryError>;

    async fn list_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<ProposalRecord>, RepositoryError>;
}

#[async_trait]
pub trait FollowUpRepository: Send + Sync {
    async fn insert(
        &self,
        follow_up: NewFollowUp,
        now: DateTime<Utc>,
    ) -> Result<FollowUpRecord, RepositoryError>;

    async fn list_for_client(
        &self,
        client_id: ClientId,
    ) -> Result<Vec<FollowUpRecord>, RepositoryError>;
}

pub(crate) fn decode<E: std::fmt::Display>(error: E) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub(crate) fn to_sql_integer(column: &str, value: u64) -> Result<i64, RepositoryError> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::Encode(format!("{column} {value} exceeds the SQLite integer range")))
}

pub(crate) fn from_sql_integer(column: &str, value: i64) -> Result<u64, RepositoryError> {
    u64::try_from(value).map_err(|_| RepositoryError::Decode(format!("negative {column} {value}")))
}

pub(crate) fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid {column} `{raw}`: {error}")))
}
