pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod extraction;
pub mod playbook;
pub mod render;

pub use cpq::catalog::{Branding, Catalog, CatalogKind, PricingBasis};
pub use cpq::pricing::{price_plan, DeterministicPricingEngine, PricingEngine, PricingInput};
pub use cpq::segmentation::SegmentClassifier;
pub use cpq::{ClientSource, ProposalBundle, ProposalPipeline, ProposalRequest};
pub use domain::client::{ClientFacts, ClientId, ClientRecord, ClientStatus, NewClient, Region};
pub use domain::plan::{Plan, PlanId};
pub use domain::proposal::{ProposalDocument, ProposalOptions};
pub use domain::quote::{PricingTraceStep, Quote};
pub use domain::segment::{Segment, SegmentId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use extraction::{Extraction, ExtractionNotice, FactsExtractor, FieldExtractor};
pub use render::ProposalRenderer;
