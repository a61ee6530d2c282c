use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::segment::SegmentId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub i64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Apac,
    Europe,
    Americas,
    Global,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apac => "apac",
            Self::Europe => "europe",
            Self::Americas => "americas",
            Self::Global => "global",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "apac" => Ok(Self::Apac),
            "europe" => Ok(Self::Europe),
            "americas" => Ok(Self::Americas),
            "global" => Ok(Self::Global),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported region `{other}` (expected apac|europe|americas|global)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientStatus {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 6] = [
        Self::Lead,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::ClosedWon,
        Self::ClosedLost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::ClosedWon => "closed-won",
            Self::ClosedLost => "closed-lost",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Self::ALL.into_iter().find(|status| status.as_str() == value.trim()).ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "unsupported client status `{}`",
                value.trim()
            ))
        })
    }
}

/// Structured description of one prospective customer, either extracted from a
/// transcript or supplied directly by a caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFacts {
    pub company_name: String,
    pub contact_name: String,
    #[serde(default)]
    pub contact_role: Option<String>,
    /// Headcount for per-employee catalogs, monthly transaction volume for flat ones.
    pub employee_count: u64,
    pub region: Region,
    pub segment: SegmentId,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

pub const MAX_FACT_ITEMS: usize = 3;

impl ClientFacts {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.company_name.trim().is_empty() {
            return Err(DomainError::InvariantViolation(
                "company_name must not be empty".to_string(),
            ));
        }
        if self.pain_points.len() > MAX_FACT_ITEMS || self.requirements.len() > MAX_FACT_ITEMS {
            return Err(DomainError::InvariantViolation(format!(
                "at most {MAX_FACT_ITEMS} pain points and requirements are kept per client"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub facts: ClientFacts,
    pub email: String,
    pub phone: Option<String>,
    pub status: ClientStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    pub facts: ClientFacts,
    pub email: String,
    pub phone: Option<String>,
    pub status: ClientStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientRecord {
    pub fn from_new(id: ClientId, client: NewClient, now: DateTime<Utc>) -> Self {
        Self {
            id,
            facts: client.facts,
            email: client.email,
            phone: client.phone,
            status: client.status,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub segment: Option<SegmentId>,
    pub status: Option<ClientStatus>,
    pub region: Option<Region>,
}

impl ClientFilter {
    pub fn matches(&self, record: &ClientRecord) -> bool {
        self.segment.map_or(true, |segment| record.facts.segment == segment)
            && self.status.map_or(true, |status| record.status == status)
            && self.region.map_or(true, |region| record.facts.region == region)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientStatus, Region};

    #[test]
    fn status_round_trips_through_wire_name() {
        for status in ClientStatus::ALL {
            assert_eq!(ClientStatus::parse(status.as_str()), Ok(status));
        }
        assert!(ClientStatus::parse("won").is_err());
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&ClientStatus::ClosedWon).expect("serialize");
        assert_eq!(json, "\"closed-won\"");
    }

    #[test]
    fn region_parse_is_case_insensitive() {
        assert_eq!(Region::parse(" APAC "), Ok(Region::Apac));
        assert!(Region::parse("mars").is_err());
    }
}
