use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::client::ClientId;
use crate::domain::plan::PlanId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalOptions {
    pub validity_days: u32,
    pub start_date: NaiveDate,
    pub notes: Option<String>,
}

impl ProposalOptions {
    /// Notes that actually render; whitespace-only notes count as absent.
    pub fn visible_notes(&self) -> Option<&str> {
        self.notes.as_deref().map(str::trim).filter(|notes| !notes.is_empty())
    }
}

/// Rendered offer document. Write-once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDocument {
    pub html: String,
    pub generated_at: DateTime<Utc>,
}

/// Persisted snapshot of a generated proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProposal {
    pub client_id: ClientId,
    pub plan: PlanId,
    pub unit_count: u64,
    pub discount_pct: Decimal,
    pub unit_price_after_discount: Decimal,
    pub total_price: Decimal,
    pub validity_days: u32,
    pub notes: Option<String>,
    pub html: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub client_id: ClientId,
    pub plan: PlanId,
    pub unit_count: u64,
    pub discount_pct: Decimal,
    pub unit_price_after_discount: Decimal,
    pub total_price: Decimal,
    pub validity_days: u32,
    pub notes: Option<String>,
    pub html: String,
    pub created_at: DateTime<Utc>,
}

impl ProposalRecord {
    pub fn from_new(id: ProposalId, proposal: NewProposal, now: DateTime<Utc>) -> Self {
        Self {
            id,
            client_id: proposal.client_id,
            plan: proposal.plan,
            unit_count: proposal.unit_count,
            discount_pct: proposal.discount_pct,
            unit_price_after_discount: proposal.unit_price_after_discount,
            total_price: proposal.total_price,
            validity_days: proposal.validity_days,
            notes: proposal.notes,
            html: proposal.html,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::ProposalOptions;

    fn options(notes: Option<&str>) -> ProposalOptions {
        ProposalOptions {
            validity_days: 30,
            start_date: NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date"),
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn blank_notes_are_not_visible() {
        assert_eq!(options(None).visible_notes(), None);
        assert_eq!(options(Some("   ")).visible_notes(), None);
        assert_eq!(options(Some(" pilot first ")).visible_notes(), Some("pilot first"));
    }
}
