use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use proposer_core::domain::quote::present_amount;
use proposer_core::{
    Catalog, CatalogKind, ClientFacts, ClientSource, DomainError, PlanId, ProposalPipeline,
    ProposalRequest, SegmentId,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{build_runtime, load_config, CommandResult, EXIT_INPUT};

#[derive(Debug, Clone, Args)]
pub struct ProposeArgs {
    #[arg(long, conflicts_with = "facts", required_unless_present = "facts")]
    pub transcript: Option<PathBuf>,
    #[arg(long, help = "Path to a ClientFacts JSON document")]
    pub facts: Option<PathBuf>,
    #[arg(long, help = "Segment id; required for catalogs without a size classifier")]
    pub segment: Option<String>,
    #[arg(long)]
    pub plan: String,
    #[arg(long, allow_negative_numbers = true)]
    pub units: Option<i64>,
    #[arg(long, default_value = "0")]
    pub discount: Decimal,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub validity_days: Option<u32>,
    #[arg(long, help = "Start date as YYYY-MM-DD (defaults to today)")]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub catalog: Option<CatalogKind>,
    #[arg(long, help = "Write the HTML here instead of stdout")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ProposalSummary {
    output: String,
    company_name: String,
    segment: SegmentId,
    plan: PlanId,
    unit_count: u64,
    total_price: String,
    notices: usize,
}

pub fn run(args: &ProposeArgs) -> CommandResult {
    let config = match load_config("propose") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let client = match client_source(args) {
        Ok(client) => client,
        Err(error) => {
            return CommandResult::failure("propose", "input", format!("{error:#}"), EXIT_INPUT)
        }
    };

    let request = match build_request(args, client) {
        Ok(request) => request,
        Err(error) => return CommandResult::from_application_error("propose", error.into()),
    };

    let catalog = Catalog::get(args.catalog.unwrap_or(config.catalog.default));
    let pipeline = match ProposalPipeline::for_catalog(catalog, config.proposal) {
        Ok(pipeline) => pipeline,
        Err(error) => return CommandResult::from_application_error("propose", error),
    };

    let runtime = match build_runtime("propose") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let bundle = match runtime.block_on(pipeline.run(request)) {
        Ok(bundle) => bundle,
        Err(error) => return CommandResult::from_application_error("propose", error),
    };

    let Some(path) = &args.output else {
        return CommandResult { exit_code: 0, output: bundle.document.html };
    };

    if let Err(error) = fs::write(path, &bundle.document.html)
        .with_context(|| format!("failed to write proposal to `{}`", path.display()))
    {
        return CommandResult::failure("propose", "output", format!("{error:#}"), EXIT_INPUT);
    }

    let summary = ProposalSummary {
        output: path.display().to_string(),
        company_name: bundle.facts.company_name,
        segment: bundle.segment.id,
        plan: bundle.quote.plan.id,
        unit_count: bundle.quote.unit_count,
        total_price: present_amount(bundle.quote.total_price),
        notices: bundle.notices.len(),
    };
    CommandResult::success_with_data(
        "propose",
        format!("wrote proposal to {}", summary.output),
        &summary,
    )
}

fn client_source(args: &ProposeArgs) -> anyhow::Result<ClientSource> {
    if let Some(path) = &args.facts {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read facts `{}`", path.display()))?;
        let facts: ClientFacts = serde_json::from_str(&raw)
            .with_context(|| format!("invalid facts JSON in `{}`", path.display()))?;
        return Ok(ClientSource::Facts { facts });
    }

    let path = args.transcript.as_ref().context("either --transcript or --facts is required")?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript `{}`", path.display()))?;
    Ok(ClientSource::Transcript { text, segment: None })
}

fn build_request(args: &ProposeArgs, client: ClientSource) -> Result<ProposalRequest, DomainError> {
    let plan = PlanId::parse(&args.plan)?;
    let segment = args.segment.as_deref().map(SegmentId::parse).transpose()?;

    let client = match (client, segment) {
        (ClientSource::Transcript { text, .. }, Some(segment)) => {
            ClientSource::Transcript { text, segment: Some(segment) }
        }
        (ClientSource::Facts { mut facts }, Some(segment)) => {
            facts.segment = segment;
            ClientSource::Facts { facts }
        }
        (client, None) => client,
    };

    let mut request = ProposalRequest::new(client, plan);
    request.unit_count = args.units;
    request.discount_pct = args.discount;
    request.notes = args.notes.clone();
    request.validity_days = args.validity_days;
    request.start_date = args.start_date;
    Ok(request)
}
