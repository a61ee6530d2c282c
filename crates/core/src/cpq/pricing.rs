use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::catalog::Catalog;
use crate::domain::plan::PlanId;
use crate::domain::quote::{PricingTraceStep, Quote};
use crate::errors::DomainError;

pub const MAX_DISCOUNT_PCT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingInput {
    pub plan: PlanId,
    pub unit_count: i64,
    pub discount_pct: Decimal,
}

pub trait PricingEngine: Send + Sync {
    fn quote(&self, catalog: &Catalog, input: &PricingInput) -> Result<Quote, DomainError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn quote(&self, catalog: &Catalog, input: &PricingInput) -> Result<Quote, DomainError> {
        price_plan(catalog, input.plan, input.unit_count, input.discount_pct)
    }
}

pub fn validate_discount(discount_pct: Decimal) -> Result<Decimal, DomainError> {
    if discount_pct < Decimal::ZERO || discount_pct > MAX_DISCOUNT_PCT {
        return Err(DomainError::InvalidDiscount(discount_pct));
    }
    Ok(discount_pct)
}

/// Accepts a caller-supplied float percentage (tool and JSON inputs) as a decimal.
pub fn discount_from_f64(discount_pct: f64) -> Result<Decimal, DomainError> {
    let decimal = Decimal::try_from(discount_pct)
        .map_err(|_| DomainError::NonFiniteDiscount(discount_pct.to_string()))?;
    validate_discount(decimal.normalize())
}

pub fn price_plan(
    catalog: &Catalog,
    plan_id: PlanId,
    unit_count: i64,
    discount_pct: Decimal,
) -> Result<Quote, DomainError> {
    let plan = catalog.find_plan(plan_id)?;
    let discount_pct = validate_discount(discount_pct)?;
    let unit_count =
        u64::try_from(unit_count).map_err(|_| DomainError::InvalidUnitCount(unit_count))?;

    let multiplier = Decimal::ONE - discount_pct / Decimal::ONE_HUNDRED;
    let unit_price_after_discount = plan.unit_price * multiplier;
    let total_price = unit_price_after_discount * Decimal::from(unit_count);

    let trace = vec![
        PricingTraceStep {
            stage: "base_unit_price".to_string(),
            detail: format!("{} list price", plan.display_name),
            amount: plan.unit_price,
        },
        PricingTraceStep {
            stage: "discount".to_string(),
            detail: format!("{discount_pct}% off the list price"),
            amount: plan.unit_price - unit_price_after_discount,
        },
        PricingTraceStep {
            stage: "unit_price_after_discount".to_string(),
            detail: "unit_price * (1 - discount_pct / 100)".to_string(),
            amount: unit_price_after_discount,
        },
        PricingTraceStep {
            stage: "total".to_string(),
            detail: format!("unit_price_after_discount * {unit_count} units"),
            amount: total_price,
        },
    ];

    Ok(Quote {
        plan: plan.clone(),
        unit_count,
        discount_pct,
        unit_price_after_discount,
        total_price,
        trace,
    })
}
