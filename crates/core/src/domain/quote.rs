use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::plan::Plan;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

/// Computed price for one plan, unit count and discount. Amounts are kept at full
/// precision; rounding to cents happens only when presented.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub plan: Plan,
    pub unit_count: u64,
    pub discount_pct: Decimal,
    pub unit_price_after_discount: Decimal,
    pub total_price: Decimal,
    pub trace: Vec<PricingTraceStep>,
}

impl Quote {
    pub fn has_discount(&self) -> bool {
        self.discount_pct > Decimal::ZERO
    }

    pub fn unit_price(&self) -> Decimal {
        self.plan.unit_price
    }
}

/// Rounds a currency amount to cents for display. Exact half-cents round up.
pub fn present_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::present_amount;

    #[test]
    fn present_amount_rounds_to_cents() {
        assert_eq!(present_amount(Decimal::new(3_150, 3)), "3.15");
        assert_eq!(present_amount(Decimal::new(378, 0)), "378.00");
        assert_eq!(present_amount(Decimal::new(2_125, 3)), "2.13");
        assert_eq!(present_amount(Decimal::new(71_250, 4)), "7.13");
        assert_eq!(present_amount(Decimal::new(2_145, 3)), "2.15");
    }
}
