use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::client::ClientId;
use crate::errors::DomainError;

pub const MAX_FOLLOW_UP_DAYS: i64 = 90;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FollowUpId(pub i64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpKind {
    Call,
    Email,
    Demo,
    Proposal,
}

impl FollowUpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Email => "email",
            Self::Demo => "demo",
            Self::Proposal => "proposal",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(Self::Call),
            "email" => Ok(Self::Email),
            "demo" => Ok(Self::Demo),
            "proposal" => Ok(Self::Proposal),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported follow-up kind `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpStatus {
    Scheduled,
    Done,
    Cancelled,
}

impl FollowUpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "done" => Self::Done,
            "cancelled" => Self::Cancelled,
            _ => Self::Scheduled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFollowUp {
    pub client_id: ClientId,
    pub kind: FollowUpKind,
    pub scheduled_for: DateTime<Utc>,
    pub notes: Option<String>,
}

impl NewFollowUp {
    pub fn schedule(
        client_id: ClientId,
        kind: FollowUpKind,
        days_from_now: i64,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !(1..=MAX_FOLLOW_UP_DAYS).contains(&days_from_now) {
            return Err(DomainError::InvalidFollowUpDelay(days_from_now));
        }

        Ok(Self { client_id, kind, scheduled_for: now + Duration::days(days_from_now), notes })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpRecord {
    pub id: FollowUpId,
    pub client_id: ClientId,
    pub kind: FollowUpKind,
    pub scheduled_for: DateTime<Utc>,
    pub notes: Option<String>,
    pub status: FollowUpStatus,
    pub created_at: DateTime<Utc>,
}

impl FollowUpRecord {
    pub fn from_new(id: FollowUpId, follow_up: NewFollowUp, now: DateTime<Utc>) -> Self {
        Self {
            id,
            client_id: follow_up.client_id,
            kind: follow_up.kind,
            scheduled_for: follow_up.scheduled_for,
            notes: follow_up.notes,
            status: FollowUpStatus::Scheduled,
            created_at: now,
        }
    }
}
