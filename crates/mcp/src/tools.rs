//! Tool logic behind the MCP server. Every operation is a plain async method on
//! [`SalesDesk`] so it can be exercised without a transport.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use proposer_core::config::{AppConfig, ProposalConfig};
use proposer_core::cpq::pricing::discount_from_f64;
use proposer_core::domain::client::ClientFilter;
use proposer_core::domain::follow_up::{FollowUpKind, NewFollowUp};
use proposer_core::domain::proposal::NewProposal;
use proposer_core::domain::quote::present_amount;
use proposer_core::errors::{ApplicationError, DomainError};
use proposer_core::extraction::ExtractionNotice;
use proposer_core::playbook::{self, CallType, EmailType};
use proposer_core::{
    price_plan, Catalog, CatalogKind, ClientFacts, ClientId, ClientRecord, ClientSource,
    ClientStatus, FieldExtractor, NewClient, PlanId, ProposalPipeline, ProposalRequest, Region,
    SegmentId,
};
use proposer_db::repositories::{
    InMemoryClientRepository, InMemoryFollowUpRepository, InMemoryProposalRepository,
};
use proposer_db::{
    ClientRepository, DbPool, FollowUpRepository, ProposalRepository, SqlClientRepository,
    SqlFollowUpRepository, SqlProposalRepository,
};
use rmcp::schemars;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::McpResult;

pub const CLIENT_NOT_FOUND: &str = "client not found";

/// Names of every tool the server registers.
pub const ALL_TOOL_NAMES: &[&str] = &[
    "add_client",
    "get_clients",
    "update_client_status",
    "generate_proposal",
    "calculate_price",
    "process_transcription",
    "get_sdr_guidelines",
    "generate_email_template",
    "get_sales_metrics",
    "schedule_follow_up",
    "list_catalog",
];

/// Tool output: structured data, or a plain message such as [`CLIENT_NOT_FOUND`].
#[derive(Clone, Debug, PartialEq)]
pub enum ToolReply {
    Data(Value),
    Message(String),
}

impl ToolReply {
    fn data(value: &impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::Data(value),
            Err(error) => Self::Message(format!("failed to serialize tool output: {error}")),
        }
    }

    fn client_not_found() -> Self {
        Self::Message(CLIENT_NOT_FOUND.to_string())
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Data(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
            Self::Message(message) => message,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddClientInput {
    /// Company name
    pub company_name: String,
    /// Segment id, e.g. small, large, otas or super-apps
    pub segment: String,
    /// Main contact's name
    pub contact_name: String,
    /// Main contact's role
    #[serde(default)]
    pub contact_role: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Headcount, or monthly transaction volume for mobility clients
    #[serde(default, alias = "monthly_volume")]
    pub employee_count: Option<u64>,
    /// apac, europe, americas or global (default)
    #[serde(default)]
    pub region: Option<String>,
    /// Lifecycle status (default lead)
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ClientListInput {
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateStatusInput {
    pub client_id: i64,
    /// lead, qualified, proposal, negotiation, closed-won or closed-lost
    pub status: String,
    /// Replaces the client's notes when present
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateProposalInput {
    pub client_id: i64,
    /// starter, professional or enterprise
    pub plan: String,
    /// Discount percentage, 0 to 50
    #[serde(default)]
    pub discount: Option<f64>,
    /// Validity in days (defaults to the configured value)
    #[serde(default)]
    pub validity: Option<u32>,
    /// Billed units; defaults to the client's headcount or 1 for flat plans
    #[serde(default)]
    pub units: Option<i64>,
    /// Implementation start date, YYYY-MM-DD
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalculatePriceInput {
    pub plan: String,
    pub units: i64,
    #[serde(default)]
    pub discount: Option<f64>,
    /// workforce or mobility (defaults to the configured catalog)
    #[serde(default)]
    pub catalog: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProcessTranscriptionInput {
    /// Conversation transcript
    pub text: String,
    /// Segment override for catalogs that do not classify by size
    #[serde(default)]
    pub segment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GuidelinesInput {
    pub client_id: i64,
    /// cold-call, follow-up, qualification, demo or closing
    pub call_type: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EmailTemplateInput {
    pub client_id: i64,
    /// intro, follow-up, proposal-sent, demo-invite or closing
    pub email_type: String,
    #[serde(default)]
    pub custom_message: Option<String>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SalesMetricsInput {
    /// Reporting period label, echoed back (week, month, quarter or year)
    #[serde(default)]
    pub period: Option<String>,
    /// Segment id, or "all"
    #[serde(default)]
    pub segment: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScheduleFollowUpInput {
    pub client_id: i64,
    /// call, email, demo or proposal
    pub follow_up_type: String,
    /// 1 to 90
    pub days_from_now: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListCatalogInput {
    /// workforce or mobility (defaults to the configured catalog)
    #[serde(default)]
    pub catalog: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProposalSummary<'a> {
    proposal_id: i64,
    company_name: &'a str,
    catalog: CatalogKind,
    plan: PlanId,
    unit_count: u64,
    discount_pct: Decimal,
    unit_price_after_discount: String,
    total_price: String,
    validity_days: u32,
    html: &'a str,
}

/// Repositories plus one proposal pipeline per catalog.
#[derive(Clone)]
pub struct SalesDesk {
    clients: Arc<dyn ClientRepository>,
    proposals: Arc<dyn ProposalRepository>,
    follow_ups: Arc<dyn FollowUpRepository>,
    default_catalog: CatalogKind,
    validity_days: u32,
    workforce: Arc<ProposalPipeline>,
    mobility: Arc<ProposalPipeline>,
}

impl SalesDesk {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        proposals: Arc<dyn ProposalRepository>,
        follow_ups: Arc<dyn FollowUpRepository>,
        default_catalog: CatalogKind,
        settings: ProposalConfig,
    ) -> Result<Self, ApplicationError> {
        Ok(Self {
            clients,
            proposals,
            follow_ups,
            default_catalog,
            validity_days: settings.validity_days,
            workforce: Arc::new(ProposalPipeline::for_catalog(
                Catalog::workforce(),
                settings.clone(),
            )?),
            mobility: Arc::new(ProposalPipeline::for_catalog(Catalog::mobility(), settings)?),
        })
    }

    pub fn from_pool(pool: DbPool, config: &AppConfig) -> Result<Self, ApplicationError> {
        Self::new(
            Arc::new(SqlClientRepository::new(pool.clone())),
            Arc::new(SqlProposalRepository::new(pool.clone())),
            Arc::new(SqlFollowUpRepository::new(pool)),
            config.catalog.default,
            config.proposal.clone(),
        )
    }

    pub fn in_memory(config: &AppConfig) -> Result<Self, ApplicationError> {
        Self::new(
            Arc::new(InMemoryClientRepository::default()),
            Arc::new(InMemoryProposalRepository::default()),
            Arc::new(InMemoryFollowUpRepository::default()),
            config.catalog.default,
            config.proposal.clone(),
        )
    }

    pub async fn add_client(
        &self,
        input: AddClientInput,
        now: DateTime<Utc>,
    ) -> McpResult<ToolReply> {
        let region = parse_optional(input.region.as_deref(), Region::parse)?;
        let facts = ClientFacts {
            company_name: input.company_name.trim().to_string(),
            contact_name: input.contact_name.trim().to_string(),
            contact_role: input.contact_role,
            employee_count: input.employee_count.unwrap_or(0),
            region: region.unwrap_or(Region::Global),
            segment: SegmentId::parse(&input.segment)?,
            pain_points: input.pain_points,
            requirements: input.requirements,
        };
        facts.validate()?;
        self.catalog_for(facts.segment).find_segment(facts.segment)?;

        let client = NewClient {
            facts,
            email: input.email.trim().to_string(),
            phone: input.phone,
            status: parse_optional(input.status.as_deref(), ClientStatus::parse)?
                .unwrap_or(ClientStatus::Lead),
        };
        let record = self.clients.insert(client, now).await?;
        Ok(ToolReply::data(&record))
    }

    pub async fn get_clients(&self, input: ClientListInput) -> McpResult<ToolReply> {
        let filter = ClientFilter {
            segment: parse_optional(input.segment.as_deref(), SegmentId::parse)?,
            status: parse_optional(input.status.as_deref(), ClientStatus::parse)?,
            region: parse_optional(input.region.as_deref(), Region::parse)?,
        };
        let clients = self.clients.list(&filter).await?;
        Ok(ToolReply::data(&json!({ "count": clients.len(), "clients": clients })))
    }

    pub async fn update_client_status(
        &self,
        input: UpdateStatusInput,
        now: DateTime<Utc>,
    ) -> McpResult<ToolReply> {
        let status = ClientStatus::parse(&input.status)?;
        let change =
            self.clients.update_status(ClientId(input.client_id), status, input.notes, now).await?;

        Ok(match change {
            Some(change) => ToolReply::data(&change),
            None => ToolReply::client_not_found(),
        })
    }

    pub async fn generate_proposal(
        &self,
        input: GenerateProposalInput,
        now: DateTime<Utc>,
    ) -> McpResult<ToolReply> {
        let Some(client) = self.clients.find_by_id(ClientId(input.client_id)).await? else {
            return Ok(ToolReply::client_not_found());
        };

        let kind = self.catalog_for(client.facts.segment).kind();
        let mut request = ProposalRequest::new(
            ClientSource::Facts { facts: client.facts.clone() },
            PlanId::parse(&input.plan)?,
        );
        request.unit_count = input.units;
        request.discount_pct = discount_from_f64(input.discount.unwrap_or(0.0))?;
        request.notes = input.notes;
        request.validity_days = Some(input.validity.unwrap_or(self.validity_days));
        request.start_date = input.start_date.as_deref().map(parse_start_date).transpose()?;

        let bundle = self.pipeline(kind).run_at(request.clone(), now).await?;
        log_extraction_notices(&bundle.notices);
        let validity_days = request.validity_days.unwrap_or(self.validity_days);

        let stored = self
            .proposals
            .insert(
                NewProposal {
                    client_id: client.id,
                    plan: bundle.quote.plan.id,
                    unit_count: bundle.quote.unit_count,
                    discount_pct: bundle.quote.discount_pct,
                    unit_price_after_discount: bundle.quote.unit_price_after_discount,
                    total_price: bundle.quote.total_price,
                    validity_days,
                    notes: request.notes,
                    html: bundle.document.html,
                },
                now,
            )
            .await?;

        Ok(ToolReply::data(&ProposalSummary {
            proposal_id: stored.id.0,
            company_name: &client.facts.company_name,
            catalog: kind,
            plan: stored.plan,
            unit_count: stored.unit_count,
            discount_pct: stored.discount_pct,
            unit_price_after_discount: present_amount(stored.unit_price_after_discount),
            total_price: present_amount(stored.total_price),
            validity_days: stored.validity_days,
            html: &stored.html,
        }))
    }

    pub fn calculate_price(&self, input: CalculatePriceInput) -> McpResult<ToolReply> {
        let catalog = self.catalog_named(input.catalog.as_deref())?;
        let discount = discount_from_f64(input.discount.unwrap_or(0.0))?;
        let quote = price_plan(catalog, PlanId::parse(&input.plan)?, input.units, discount)?;
        Ok(ToolReply::data(&quote))
    }

    pub async fn process_transcription(
        &self,
        input: ProcessTranscriptionInput,
    ) -> McpResult<ToolReply> {
        let mut extraction = FieldExtractor::shared().extract(&input.text);
        if let Some(segment) = parse_optional(input.segment.as_deref(), SegmentId::parse)? {
            extraction.facts.segment = segment;
        }
        log_extraction_notices(&extraction.notices);
        Ok(ToolReply::data(&extraction))
    }

    pub async fn get_sdr_guidelines(&self, input: GuidelinesInput) -> McpResult<ToolReply> {
        let call_type = CallType::parse(&input.call_type)?;
        let Some(client) = self.find_client(input.client_id).await? else {
            return Ok(ToolReply::client_not_found());
        };
        Ok(ToolReply::data(&playbook::call_guidelines(&client, call_type)))
    }

    pub async fn generate_email_template(&self, input: EmailTemplateInput) -> McpResult<ToolReply> {
        let email_type = EmailType::parse(&input.email_type)?;
        let Some(client) = self.find_client(input.client_id).await? else {
            return Ok(ToolReply::client_not_found());
        };
        let branding = self.catalog_for(client.facts.segment).branding();
        let draft =
            playbook::email_draft(&client, branding, email_type, input.custom_message.as_deref());
        Ok(ToolReply::data(&draft))
    }

    pub async fn get_sales_metrics(&self, input: SalesMetricsInput) -> McpResult<ToolReply> {
        let segment = match input.segment.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(segment) => Some(SegmentId::parse(segment)?),
        };
        let clients = self.clients.list(&ClientFilter::default()).await?;
        let metrics = playbook::sales_metrics(&clients, segment);
        Ok(ToolReply::data(&json!({
            "period": input.period.unwrap_or_else(|| "month".to_string()),
            "metrics": metrics,
        })))
    }

    pub async fn schedule_follow_up(
        &self,
        input: ScheduleFollowUpInput,
        now: DateTime<Utc>,
    ) -> McpResult<ToolReply> {
        let kind = FollowUpKind::parse(&input.follow_up_type)?;
        let Some(client) = self.find_client(input.client_id).await? else {
            return Ok(ToolReply::client_not_found());
        };
        let follow_up =
            NewFollowUp::schedule(client.id, kind, input.days_from_now, input.notes, now)?;
        let stored = self.follow_ups.insert(follow_up, now).await?;
        Ok(ToolReply::data(&json!({
            "company_name": client.facts.company_name,
            "follow_up": stored,
        })))
    }

    pub fn list_catalog(&self, input: ListCatalogInput) -> McpResult<ToolReply> {
        let catalog = self.catalog_named(input.catalog.as_deref())?;
        Ok(ToolReply::data(&json!({
            "kind": catalog.kind(),
            "basis": catalog.basis(),
            "branding": catalog.branding(),
            "plans": catalog.plans(),
            "segments": catalog.segments(),
        })))
    }

    async fn find_client(&self, id: i64) -> McpResult<Option<ClientRecord>> {
        Ok(self.clients.find_by_id(ClientId(id)).await?)
    }

    fn pipeline(&self, kind: CatalogKind) -> &ProposalPipeline {
        match kind {
            CatalogKind::Workforce => &self.workforce,
            CatalogKind::Mobility => &self.mobility,
        }
    }

    /// The default catalog when it carries the segment, otherwise the other one.
    fn catalog_for(&self, segment: SegmentId) -> &'static Catalog {
        let preferred = Catalog::get(self.default_catalog);
        if preferred.find_segment(segment).is_ok() {
            return preferred;
        }
        [Catalog::workforce(), Catalog::mobility()]
            .into_iter()
            .find(|catalog| catalog.find_segment(segment).is_ok())
            .unwrap_or(preferred)
    }

    fn catalog_named(&self, name: Option<&str>) -> McpResult<&'static Catalog> {
        let kind = match name {
            Some(name) => name.parse::<CatalogKind>()?,
            None => self.default_catalog,
        };
        Ok(Catalog::get(kind))
    }
}

fn parse_optional<T>(
    value: Option<&str>,
    parse: fn(&str) -> Result<T, DomainError>,
) -> Result<Option<T>, DomainError> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(parse).transpose()
}

fn parse_start_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        DomainError::InvariantViolation(format!("start_date `{value}` is not a YYYY-MM-DD date"))
    })
}

fn log_extraction_notices(notices: &[ExtractionNotice]) {
    for notice in notices {
        match notice {
            ExtractionNotice::ExtractionDefaultUsed { field } => tracing::info!(
                event_name = "extraction.default_used",
                field = field.as_str(),
                "extracted field fell back to its default"
            ),
        }
    }
}
