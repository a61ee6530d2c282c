//! Quote-and-propose runtime: resolve client facts, check the segment against the
//! selected catalog, price the chosen plan, and render the proposal document.

pub mod catalog;
pub mod pricing;
pub mod segmentation;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{ProposalConfig, VALIDITY_DAYS_RANGE};
use crate::domain::client::ClientFacts;
use crate::domain::plan::PlanId;
use crate::domain::proposal::{ProposalDocument, ProposalOptions};
use crate::domain::quote::Quote;
use crate::domain::segment::{Segment, SegmentId};
use crate::errors::{ApplicationError, DomainError};
use crate::extraction::{ExtractionNotice, FactsExtractor, FieldExtractor};
use crate::render::ProposalRenderer;

use self::{
    catalog::Catalog,
    pricing::{DeterministicPricingEngine, PricingEngine, PricingInput},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ClientSource {
    /// Free-form conversation text. `segment` is required for catalogs that do not
    /// derive the segment from client size.
    Transcript { text: String, segment: Option<SegmentId> },
    Facts { facts: ClientFacts },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    pub client: ClientSource,
    pub plan: PlanId,
    pub unit_count: Option<i64>,
    pub discount_pct: Decimal,
    pub notes: Option<String>,
    pub validity_days: Option<u32>,
    pub start_date: Option<NaiveDate>,
}

impl ProposalRequest {
    pub fn new(client: ClientSource, plan: PlanId) -> Self {
        Self {
            client,
            plan,
            unit_count: None,
            discount_pct: Decimal::ZERO,
            notes: None,
            validity_days: None,
            start_date: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProposalBundle {
    pub facts: ClientFacts,
    pub segment: Segment,
    pub quote: Quote,
    pub document: ProposalDocument,
    pub notices: Vec<ExtractionNotice>,
}

pub struct ProposalPipeline<E = FieldExtractor, P = DeterministicPricingEngine> {
    catalog: &'static Catalog,
    extractor: E,
    pricing_engine: P,
    renderer: ProposalRenderer,
    settings: ProposalConfig,
}

impl ProposalPipeline {
    pub fn for_catalog(
        catalog: &'static Catalog,
        settings: ProposalConfig,
    ) -> Result<Self, ApplicationError> {
        Self::new(catalog, FieldExtractor::shared().clone(), DeterministicPricingEngine, settings)
    }
}

impl<E, P> ProposalPipeline<E, P>
where
    E: FactsExtractor,
    P: PricingEngine,
{
    pub fn new(
        catalog: &'static Catalog,
        extractor: E,
        pricing_engine: P,
        settings: ProposalConfig,
    ) -> Result<Self, ApplicationError> {
        let renderer = ProposalRenderer::new(catalog.branding().clone())?;
        Ok(Self { catalog, extractor, pricing_engine, renderer, settings })
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    pub async fn run(&self, request: ProposalRequest) -> Result<ProposalBundle, ApplicationError> {
        self.run_at(request, Utc::now()).await
    }

    pub async fn run_at(
        &self,
        request: ProposalRequest,
        generated_at: DateTime<Utc>,
    ) -> Result<ProposalBundle, ApplicationError> {
        let (facts, notices) = self.resolve_facts(request.client).await?;
        facts.validate()?;
        let segment = self.catalog.find_segment(facts.segment)?.clone();

        if let Some(notes) = request.notes.as_deref() {
            if notes.chars().count() > self.settings.notes_max_len {
                return Err(DomainError::InvariantViolation(format!(
                    "notes exceed {} characters",
                    self.settings.notes_max_len
                ))
                .into());
            }
        }

        let unit_count = match request.unit_count {
            Some(unit_count) => unit_count,
            None => {
                let units = self.catalog.default_unit_count(facts.employee_count);
                i64::try_from(units).map_err(|_| {
                    DomainError::InvariantViolation(format!("unit count {units} is too large"))
                })?
            }
        };

        let quote = self.pricing_engine.quote(
            self.catalog,
            &PricingInput { plan: request.plan, unit_count, discount_pct: request.discount_pct },
        )?;

        let validity_days = request.validity_days.unwrap_or(self.settings.validity_days);
        if !VALIDITY_DAYS_RANGE.contains(&validity_days) {
            return Err(DomainError::InvalidValidityDays(validity_days).into());
        }

        let options = ProposalOptions {
            validity_days,
            start_date: request.start_date.unwrap_or_else(|| generated_at.date_naive()),
            notes: request.notes,
        };
        let document = self.renderer.render_at(&facts, &segment, &quote, &options, generated_at)?;

        Ok(ProposalBundle { facts, segment, quote, document, notices })
    }

    async fn resolve_facts(
        &self,
        source: ClientSource,
    ) -> Result<(ClientFacts, Vec<ExtractionNotice>), ApplicationError> {
        match source {
            ClientSource::Facts { facts } => Ok((facts, Vec::new())),
            ClientSource::Transcript { text, segment } => {
                let extraction = self.extractor.extract_facts(&text).await?;
                let mut facts = extraction.facts;
                if let Some(segment) = segment {
                    facts.segment = segment;
                } else if let Some(classifier) = self.catalog.classifier() {
                    facts.segment = classifier.classify(facts.employee_count);
                }
                Ok((facts, extraction.notices))
            }
        }
    }
}
