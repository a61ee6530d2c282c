//! HTML rendering of commercial proposals.
//!
//! The template is embedded and named with an `.html` suffix so Tera autoescapes
//! every interpolated value; client-supplied strings can never inject markup.
//! The only clock read is the footer timestamp, see [`ProposalRenderer::render_at`].

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tera::{Context, Tera};

use crate::cpq::catalog::Branding;
use crate::domain::client::ClientFacts;
use crate::domain::proposal::{ProposalDocument, ProposalOptions};
use crate::domain::quote::{present_amount, Quote};
use crate::domain::segment::Segment;
use crate::errors::ApplicationError;

const TEMPLATE_NAME: &str = "proposal.html";
const DATE_FORMAT: &str = "%d/%m/%Y";
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M UTC";
const PAYMENT_TERMS: &str = "Monthly, paid in advance";
const CONTRACT_TERMS: &str = "12-month minimum term";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimelineStep {
    pub week: &'static str,
    pub activity: &'static str,
}

pub const IMPLEMENTATION_TIMELINE: [TimelineStep; 4] = [
    TimelineStep { week: "Week 1", activity: "Setup and configuration" },
    TimelineStep { week: "Week 2", activity: "Data migration" },
    TimelineStep { week: "Week 3", activity: "Team training" },
    TimelineStep { week: "Week 4", activity: "Go-live" },
];

/// Register custom Tera filters used by the proposal template.
///
/// - `money`: rounds a decimal amount to cents, e.g. `quote.total_price | money`
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("money", tera_money_filter);
}

/// Decimals serialize as strings; plain numbers are accepted too.
fn tera_money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let amount = match value {
        tera::Value::String(raw) => Decimal::from_str(raw)
            .map_err(|error| tera::Error::msg(format!("money filter: `{raw}`: {error}")))?,
        tera::Value::Number(number) => Decimal::from_str(&number.to_string())
            .map_err(|error| tera::Error::msg(format!("money filter: `{number}`: {error}")))?,
        tera::Value::Null => Decimal::ZERO,
        other => {
            return Err(tera::Error::msg(format!("money filter expects an amount, got {other}")))
        }
    };
    Ok(tera::Value::String(present_amount(amount)))
}

#[derive(Clone, Debug)]
pub struct ProposalRenderer {
    tera: Tera,
    branding: Branding,
}

impl ProposalRenderer {
    pub fn new(branding: Branding) -> Result<Self, ApplicationError> {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);
        tera.add_raw_template(TEMPLATE_NAME, include_str!("../templates/proposal.html"))
            .map_err(|error| ApplicationError::Rendering(error.to_string()))?;

        Ok(Self { tera, branding })
    }

    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    pub fn render(
        &self,
        facts: &ClientFacts,
        segment: &Segment,
        quote: &Quote,
        options: &ProposalOptions,
    ) -> Result<ProposalDocument, ApplicationError> {
        self.render_at(facts, segment, quote, options, Utc::now())
    }

    /// Renders with an explicit footer timestamp; everything else in the document
    /// depends only on the arguments.
    pub fn render_at(
        &self,
        facts: &ClientFacts,
        segment: &Segment,
        quote: &Quote,
        options: &ProposalOptions,
        generated_at: DateTime<Utc>,
    ) -> Result<ProposalDocument, ApplicationError> {
        let mut context = Context::new();
        context.insert("brand", &self.branding);
        context.insert("client", facts);
        context.insert("contact_role", facts.contact_role.as_deref().unwrap_or("-"));
        context.insert("region", &facts.region.as_str().to_uppercase());
        context.insert("segment", segment);
        context.insert("quote", quote);
        context.insert("has_discount", &quote.has_discount());
        context.insert("timeline", &IMPLEMENTATION_TIMELINE);
        context.insert("validity_days", &options.validity_days);
        context.insert("start_date", &options.start_date.format(DATE_FORMAT).to_string());
        context.insert("payment_terms", PAYMENT_TERMS);
        context.insert("contract_terms", CONTRACT_TERMS);
        context.insert("notes", &options.visible_notes());
        context.insert("generated_at", &generated_at.format(TIMESTAMP_FORMAT).to_string());

        let html = self
            .tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|error| ApplicationError::Rendering(error.to_string()))?;

        Ok(ProposalDocument { html, generated_at })
    }
}
