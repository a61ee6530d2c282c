use clap::Args;
use proposer_core::{price_plan, Catalog, CatalogKind, PlanId};
use rust_decimal::Decimal;

use crate::commands::{load_config, CommandResult};

#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    #[arg(long, help = "Plan id: starter, professional or enterprise")]
    pub plan: String,
    #[arg(long, allow_negative_numbers = true, help = "Number of billed units")]
    pub units: i64,
    #[arg(long, default_value = "0", help = "Discount percentage, 0 to 50")]
    pub discount: Decimal,
    #[arg(long, help = "Catalog to price against (defaults to catalog.default)")]
    pub catalog: Option<CatalogKind>,
}

pub fn run(args: &QuoteArgs) -> CommandResult {
    let kind = match args.catalog {
        Some(kind) => kind,
        None => match load_config("quote") {
            Ok(config) => config.catalog.default,
            Err(failure) => return failure,
        },
    };

    let quote = PlanId::parse(&args.plan)
        .and_then(|plan| price_plan(Catalog::get(kind), plan, args.units, args.discount));

    match quote {
        Ok(quote) => CommandResult::success_with_data(
            "quote",
            format!(
                "{} x {} units: {}",
                quote.plan.display_name,
                quote.unit_count,
                proposer_core::domain::quote::present_amount(quote.total_price)
            ),
            &quote,
        ),
        Err(error) => CommandResult::from_application_error("quote", error.into()),
    }
}
