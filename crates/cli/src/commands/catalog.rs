use proposer_core::domain::plan::Plan;
use proposer_core::domain::segment::Segment;
use proposer_core::{Branding, Catalog, CatalogKind, PricingBasis};
use serde::Serialize;

use crate::commands::{load_config, CommandResult};

#[derive(Debug, Serialize)]
struct CatalogView<'a> {
    kind: CatalogKind,
    basis: PricingBasis,
    branding: &'a Branding,
    plans: &'a [Plan],
    segments: &'a [Segment],
}

pub fn run(kind: Option<CatalogKind>) -> CommandResult {
    let kind = match kind {
        Some(kind) => kind,
        None => match load_config("catalog") {
            Ok(config) => config.catalog.default,
            Err(failure) => return failure,
        },
    };

    let catalog = Catalog::get(kind);
    let view = CatalogView {
        kind: catalog.kind(),
        basis: catalog.basis(),
        branding: catalog.branding(),
        plans: catalog.plans(),
        segments: catalog.segments(),
    };

    CommandResult::success_with_data(
        "catalog",
        format!(
            "{} catalog: {} plans, {} segments",
            kind,
            catalog.plans().len(),
            catalog.segments().len()
        ),
        &view,
    )
}
