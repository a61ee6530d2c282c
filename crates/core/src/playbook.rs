//! Sales-development helpers over stored client records: call guidelines,
//! e-mail drafts and funnel metrics.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::cpq::catalog::Branding;
use crate::domain::client::{ClientRecord, ClientStatus};
use crate::domain::segment::SegmentId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallType {
    ColdCall,
    FollowUp,
    Qualification,
    Demo,
    Closing,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ColdCall => "cold-call",
            Self::FollowUp => "follow-up",
            Self::Qualification => "qualification",
            Self::Demo => "demo",
            Self::Closing => "closing",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cold-call" => Ok(Self::ColdCall),
            "follow-up" => Ok(Self::FollowUp),
            "qualification" => Ok(Self::Qualification),
            "demo" => Ok(Self::Demo),
            "closing" => Ok(Self::Closing),
            other => Err(DomainError::InvariantViolation(format!("unknown call type `{other}`"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmailType {
    Intro,
    FollowUp,
    ProposalSent,
    DemoInvite,
    Closing,
}

impl EmailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::FollowUp => "follow-up",
            Self::ProposalSent => "proposal-sent",
            Self::DemoInvite => "demo-invite",
            Self::Closing => "closing",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "intro" => Ok(Self::Intro),
            "follow-up" => Ok(Self::FollowUp),
            "proposal-sent" => Ok(Self::ProposalSent),
            "demo-invite" => Ok(Self::DemoInvite),
            "closing" => Ok(Self::Closing),
            other => Err(DomainError::InvariantViolation(format!("unknown email type `{other}`"))),
        }
    }
}

struct SegmentPlaybook {
    segment: SegmentId,
    cold_call: &'static [&'static str],
    follow_up: &'static [&'static str],
}

/// Segment used when a client's segment has no playbook entry.
pub const DEFAULT_PLAYBOOK_SEGMENT: SegmentId = SegmentId::Otas;

const PLAYBOOKS: &[SegmentPlaybook] = &[
    SegmentPlaybook {
        segment: SegmentId::SuperApps,
        cold_call: &[
            "Lead with the mobility-as-a-service vision",
            "Mention time to first transaction under 90 days",
            "Highlight 15%+ revenue growth potential",
            "Talk about end-to-end operational simplification",
        ],
        follow_up: &[
            "Recall the APAC market opportunity",
            "Mention similar success stories",
            "Offer a 30-day proof of concept",
            "Highlight dedicated 24/7 support",
        ],
    },
    SegmentPlaybook {
        segment: SegmentId::Otas,
        cold_call: &[
            "Frame ground transport as a profit centre, not a cost",
            "Mention revenue-per-booking optimisation",
            "Highlight 70% shorter integration time",
            "Talk about consolidated financial settlement",
        ],
        follow_up: &[
            "Recall their current integration debt",
            "Mention ROI within 6 months",
            "Offer a 90-day proof of concept",
            "Highlight advanced analytics",
        ],
    },
    SegmentPlaybook {
        segment: SegmentId::Startups,
        cold_call: &[
            "Ask how HR work is handled today",
            "Mention setup and onboarding included in every plan",
            "Highlight 10 hours a week saved on admin work",
            "Keep the pitch short and price-led",
        ],
        follow_up: &[
            "Recall the manual processes they described",
            "Offer a guided trial with their own data",
            "Mention the upgrade path as the team grows",
        ],
    },
    SegmentPlaybook {
        segment: SegmentId::Small,
        cold_call: &[
            "Ask how growth is affecting HR operations",
            "Mention automatic compliance with labour legislation",
            "Highlight real-time reporting",
        ],
        follow_up: &[
            "Recall the compliance pain points",
            "Offer a demo of advanced reports",
            "Mention implementation consulting in the Professional plan",
        ],
    },
    SegmentPlaybook {
        segment: SegmentId::Medium,
        cold_call: &[
            "Map the systems HR depends on today",
            "Highlight integrations with existing systems",
            "Mention 40% lower operating costs",
        ],
        follow_up: &[
            "Bring an integration plan for their stack",
            "Offer a technical session with IT",
            "Mention reference customers of similar size",
        ],
    },
    SegmentPlaybook {
        segment: SegmentId::Large,
        cold_call: &[
            "Position HR as a strategic function",
            "Mention the dedicated account manager",
            "Highlight the 99.9% uptime SLA",
        ],
        follow_up: &[
            "Propose an executive sponsor meeting",
            "Share a customisation roadmap",
            "Mention ROI within 12 months",
        ],
    },
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CallGuidelines {
    pub company_name: String,
    pub call_type: CallType,
    pub segment: SegmentId,
    pub key_points: Vec<String>,
    pub contact_name: String,
    pub contact_role: Option<String>,
    pub employee_count: u64,
    pub region: String,
    pub status: ClientStatus,
}

/// Talking points for one call. Call types without a dedicated list use the
/// cold-call list; segments without a playbook use [`DEFAULT_PLAYBOOK_SEGMENT`].
pub fn call_guidelines(client: &ClientRecord, call_type: CallType) -> CallGuidelines {
    let playbook = PLAYBOOKS
        .iter()
        .find(|entry| entry.segment == client.facts.segment)
        .or_else(|| PLAYBOOKS.iter().find(|entry| entry.segment == DEFAULT_PLAYBOOK_SEGMENT))
        .unwrap_or(&PLAYBOOKS[0]);

    let points = match call_type {
        CallType::FollowUp => playbook.follow_up,
        _ => playbook.cold_call,
    };

    CallGuidelines {
        company_name: client.facts.company_name.clone(),
        call_type,
        segment: client.facts.segment,
        key_points: points.iter().map(|point| point.to_string()).collect(),
        contact_name: client.facts.contact_name.clone(),
        contact_role: client.facts.contact_role.clone(),
        employee_count: client.facts.employee_count,
        region: client.facts.region.as_str().to_string(),
        status: client.status,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EmailDraft {
    pub email_type: EmailType,
    pub to_name: String,
    pub to_address: String,
    pub subject: String,
    pub body: String,
    pub custom_message: Option<String>,
}

/// Drafts an e-mail for the client. Types without a dedicated template fall back to the intro.
pub fn email_draft(
    client: &ClientRecord,
    branding: &Branding,
    email_type: EmailType,
    custom_message: Option<&str>,
) -> EmailDraft {
    let company = &client.facts.company_name;
    let contact = &client.facts.contact_name;
    let brand = &branding.brand_name;

    let (subject, body) = match email_type {
        EmailType::FollowUp => (
            format!("Following up on our conversation - {company}"),
            format!(
                "Hello {contact},\n\n\
                 I hope you are well! Following up on our previous conversation about how {brand} \
                 can help {company} streamline its operations.\n\n\
                 Could we schedule a tailored demo to show exactly how our solution fits the needs of {company}?\n\n\
                 Best regards,\n[YOUR NAME]"
            ),
        ),
        EmailType::ProposalSent => (
            format!("Your {brand} proposal - {company}"),
            format!(
                "Hello {contact},\n\n\
                 As promised, the commercial proposal for {company} is attached. It covers the plan \
                 we discussed, the implementation timeline and the commercial terms.\n\n\
                 I am happy to walk you through it on a short call this week.\n\n\
                 Best regards,\n[YOUR NAME]"
            ),
        ),
        EmailType::Intro | EmailType::DemoInvite | EmailType::Closing => (
            format!("{brand} - {} for {company}", branding.tagline),
            format!(
                "Hello {contact},\n\n\
                 I am [YOUR NAME] from {brand}. I would like to show how we can help {company} \
                 turn a cost centre into a competitive advantage.\n\n\
                 Could we book a 15-minute call to see how this applies to your case?\n\n\
                 Best regards,\n[YOUR NAME]"
            ),
        ),
    };

    EmailDraft {
        email_type,
        to_name: contact.clone(),
        to_address: client.email.clone(),
        subject,
        body,
        custom_message: custom_message
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .map(str::to_string),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SalesMetrics {
    pub segment: Option<SegmentId>,
    pub total_clients: usize,
    pub leads: usize,
    pub qualified: usize,
    pub proposals: usize,
    pub negotiation: usize,
    pub won: usize,
    pub lost: usize,
    /// Percentage of won clients over all clients, one decimal place.
    pub conversion_rate: Decimal,
}

pub fn sales_metrics(clients: &[ClientRecord], segment: Option<SegmentId>) -> SalesMetrics {
    let selected: Vec<&ClientRecord> = clients
        .iter()
        .filter(|client| segment.map_or(true, |segment| client.facts.segment == segment))
        .collect();
    let count = |status: ClientStatus| selected.iter().filter(|client| client.status == status).count();

    let total_clients = selected.len();
    let won = count(ClientStatus::ClosedWon);
    let conversion_rate = if total_clients == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(won as u64) * Decimal::ONE_HUNDRED / Decimal::from(total_clients as u64))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    };

    SalesMetrics {
        segment,
        total_clients,
        leads: count(ClientStatus::Lead),
        qualified: count(ClientStatus::Qualified),
        proposals: count(ClientStatus::Proposal),
        negotiation: count(ClientStatus::Negotiation),
        won,
        lost: count(ClientStatus::ClosedLost),
        conversion_rate,
    }
}
