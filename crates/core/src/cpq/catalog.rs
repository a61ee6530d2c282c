use std::fmt;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::segmentation::SegmentClassifier;
use crate::domain::plan::{Plan, PlanId};
use crate::domain::segment::{Segment, SegmentId};
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Workforce,
    Mobility,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workforce => "workforce",
            Self::Mobility => "mobility",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CatalogKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "workforce" => Ok(Self::Workforce),
            "mobility" => Ok(Self::Mobility),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported catalog `{other}` (expected workforce|mobility)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingBasis {
    /// Unit price is charged per employee per month.
    PerEmployee,
    /// Unit price is a flat monthly fee.
    FlatMonthly,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub brand_name: String,
    pub tagline: String,
    pub currency_symbol: String,
    /// Suffix printed after unit prices, e.g. "/employee/month".
    pub unit_label: String,
    /// Label of the client-size fact, e.g. "Employees".
    pub size_label: String,
}

/// Static, read-only table of plans and segments for one product line.
#[derive(Clone, Debug)]
pub struct Catalog {
    kind: CatalogKind,
    basis: PricingBasis,
    branding: Branding,
    plans: Vec<Plan>,
    segments: Vec<Segment>,
    classifier: Option<SegmentClassifier>,
}

static WORKFORCE: Lazy<Catalog> = Lazy::new(build_workforce);
static MOBILITY: Lazy<Catalog> = Lazy::new(build_mobility);

impl Catalog {
    pub fn new(
        kind: CatalogKind,
        basis: PricingBasis,
        branding: Branding,
        plans: Vec<Plan>,
        segments: Vec<Segment>,
        classifier: Option<SegmentClassifier>,
    ) -> Self {
        Self { kind, basis, branding, plans, segments, classifier }
    }

    pub fn get(kind: CatalogKind) -> &'static Catalog {
        match kind {
            CatalogKind::Workforce => &WORKFORCE,
            CatalogKind::Mobility => &MOBILITY,
        }
    }

    pub fn workforce() -> &'static Catalog {
        Self::get(CatalogKind::Workforce)
    }

    pub fn mobility() -> &'static Catalog {
        Self::get(CatalogKind::Mobility)
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn basis(&self) -> PricingBasis {
        self.basis
    }

    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Present only for catalogs whose segment is derived from the client size.
    pub fn classifier(&self) -> Option<&SegmentClassifier> {
        self.classifier.as_ref()
    }

    pub fn find_plan(&self, plan_id: PlanId) -> Result<&Plan, DomainError> {
        self.plans
            .iter()
            .find(|plan| plan.id == plan_id)
            .ok_or_else(|| DomainError::UnknownPlan(plan_id.as_str().to_string()))
    }

    pub fn find_segment(&self, segment_id: SegmentId) -> Result<&Segment, DomainError> {
        self.segments
            .iter()
            .find(|segment| segment.id == segment_id)
            .ok_or_else(|| DomainError::UnknownSegment(segment_id.as_str().to_string()))
    }

    /// Unit count used when the caller does not pick one.
    pub fn default_unit_count(&self, client_size: u64) -> u64 {
        match self.basis {
            PricingBasis::PerEmployee => client_size,
            PricingBasis::FlatMonthly => 1,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

fn plan(
    id: PlanId,
    display_name: &str,
    unit_price: Decimal,
    description: &str,
    features: &[&str],
) -> Plan {
    Plan {
        id,
        display_name: display_name.to_string(),
        unit_price,
        description: description.to_string(),
        features: strings(features),
    }
}

fn segment(
    id: SegmentId,
    display_name: &str,
    value_proposition: &str,
    pain_points: &[&str],
    benefits: &[&str],
) -> Segment {
    Segment {
        id,
        display_name: display_name.to_string(),
        value_proposition: value_proposition.to_string(),
        pain_points: strings(pain_points),
        benefits: strings(benefits),
    }
}

fn build_workforce() -> Catalog {
    let plans = vec![
        plan(
            PlanId::Starter,
            "STARTER",
            Decimal::new(250, 2),
            "For small companies",
            &[
                "Up to 50 employees",
                "Core HR management",
                "Time tracking",
                "Standard reports",
                "Email support",
                "Setup and onboarding included",
            ],
        ),
        plan(
            PlanId::Professional,
            "PROFESSIONAL",
            Decimal::new(350, 2),
            "For growing companies",
            &[
                "Up to 200 employees",
                "Complete HR management",
                "Advanced time tracking",
                "Advanced reports",
                "Integrations",
                "Priority support",
                "Implementation consulting",
            ],
        ),
        plan(
            PlanId::Enterprise,
            "ENTERPRISE",
            Decimal::new(450, 2),
            "For large companies",
            &[
                "Unlimited employees",
                "Complete HR management",
                "Advanced time tracking",
                "Custom reports",
                "Unlimited integrations",
                "Dedicated support",
                "Account manager",
                "99.9% uptime SLA",
            ],
        ),
    ];

    let segments = vec![
        segment(
            SegmentId::Startups,
            "Startups (1-50 employees)",
            "Run HR properly from day one with a complete solution that grows with you",
            &[
                "Manual HR processes eat up time",
                "No visibility into team performance",
                "Payroll costs are hard to control",
            ],
            &[
                "80% of HR processes automated",
                "10 hours a week saved on admin work",
                "Full control over costs and performance",
            ],
        ),
        segment(
            SegmentId::Small,
            "Small Companies (51-200 employees)",
            "Scale HR with automated processes and advanced reporting",
            &[
                "Fast growth without a matching HR structure",
                "Complex compliance and labour rules",
                "Not enough data for decision making",
            ],
            &[
                "Automatic compliance with labour legislation",
                "Real-time reports for strategic decisions",
                "60% less time spent on processes",
            ],
        ),
        segment(
            SegmentId::Medium,
            "Medium Companies (201-1000 employees)",
            "Streamline HR operations with advanced integrations and analytics",
            &[
                "Many disconnected systems",
                "Little visibility across departments",
                "High operating costs",
            ],
            &[
                "Full integration with existing systems",
                "360° view of the organisation",
                "40% lower operating costs",
            ],
        ),
        segment(
            SegmentId::Large,
            "Large Companies (1000+ employees)",
            "Turn HR into a strategic function with AI and advanced analytics",
            &[
                "Extreme operational complexity",
                "Lack of strategic insight",
                "Need for deep customisation",
            ],
            &["AI-driven strategic insights", "Complete customisation", "300%+ ROI within 12 months"],
        ),
    ];

    Catalog::new(
        CatalogKind::Workforce,
        PricingBasis::PerEmployee,
        Branding {
            brand_name: "PEOPLEDESK".to_string(),
            tagline: "Modern HR management for growing companies".to_string(),
            currency_symbol: "€".to_string(),
            unit_label: "/employee/month".to_string(),
            size_label: "Employees".to_string(),
        },
        plans,
        segments,
        Some(SegmentClassifier::workforce()),
    )
}

fn build_mobility() -> Catalog {
    let plans = vec![
        plan(
            PlanId::Starter,
            "STARTER",
            Decimal::new(2_500, 0),
            "For OTAs and wholesalers",
            &[
                "Access to the ground transport inventory",
                "Standard booking API",
                "Monthly consolidated settlement",
                "Email support",
            ],
        ),
        plan(
            PlanId::Professional,
            "PROFESSIONAL",
            Decimal::new(7_500, 0),
            "For global OTAs",
            &[
                "Everything in Starter",
                "Dynamic pricing and ancillaries",
                "Advanced analytics",
                "Priority integration support",
                "Dedicated onboarding manager",
            ],
        ),
        plan(
            PlanId::Enterprise,
            "ENTERPRISE",
            Decimal::new(25_000, 0),
            "For super apps",
            &[
                "Everything in Professional",
                "One contract, one settlement",
                "Custom content and white label",
                "24/7 dedicated support",
                "Guaranteed SLA",
            ],
        ),
    ];

    let segments = vec![
        segment(
            SegmentId::SuperApps,
            "Super Apps",
            "Complete the mobility-as-a-service offer with ground transport in under 90 days",
            &[
                "Ground transport missing from the in-app journey",
                "Long time to first transaction with every new carrier",
                "Fragmented contracts and settlements",
            ],
            &[
                "Time to first transaction under 90 days",
                "15%+ revenue growth per passenger",
                "One contract and one settlement for every carrier",
            ],
        ),
        segment(
            SegmentId::Otas,
            "Online Travel Agencies",
            "Turn ground transport from a cost into a profit centre",
            &[
                "Technical debt in carrier integrations",
                "Low average revenue per booking",
                "Manual financial reconciliation",
            ],
            &[
                "70% faster integrations",
                "Optimised revenue per booking",
                "Consolidated financial settlement",
            ],
        ),
        segment(
            SegmentId::Wholesalers,
            "Wholesalers",
            "Expand the inventory you resell without new integrations",
            &[
                "Limited ground transport inventory",
                "Slow contracting with local carriers",
                "Thin margins on resold content",
            ],
            &["Thousands of carriers through one API", "Ready-to-sell content", "Better net rates"],
        ),
        segment(
            SegmentId::Gds,
            "Global Distribution Systems",
            "Distribute ground transport next to air and rail content",
            &[
                "Ground content not available to agents",
                "Non-standard carrier data",
                "Costly connectivity maintenance",
            ],
            &[
                "Normalised ground transport content",
                "Single connectivity to maintain",
                "New revenue stream for agents",
            ],
        ),
    ];

    Catalog::new(
        CatalogKind::Mobility,
        PricingBasis::FlatMonthly,
        Branding {
            brand_name: "GROUNDLINK".to_string(),
            tagline: "Ground transport distribution for travel platforms".to_string(),
            currency_symbol: "€".to_string(),
            unit_label: "/month".to_string(),
            size_label: "Monthly volume".to_string(),
        },
        plans,
        segments,
        None,
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Catalog, CatalogKind, PricingBasis};
    use crate::domain::plan::PlanId;
    use crate::domain::segment::SegmentId;
    use crate::errors::DomainError;

    #[test]
    fn workforce_catalog_prices_per_employee() {
        let catalog = Catalog::workforce();
        assert_eq!(catalog.basis(), PricingBasis::PerEmployee);
        let plan = catalog.find_plan(PlanId::Professional).expect("professional plan");
        assert_eq!(plan.unit_price, Decimal::new(350, 2));
        assert_eq!(plan.display_name, "PROFESSIONAL");
        assert_eq!(plan.features.len(), 7);
        assert_eq!(catalog.default_unit_count(120), 120);
    }

    #[test]
    fn mobility_catalog_is_flat_and_has_no_classifier() {
        let catalog = Catalog::mobility();
        assert!(catalog.classifier().is_none());
        assert_eq!(catalog.default_unit_count(40_000), 1);
        let plan = catalog.find_plan(PlanId::Enterprise).expect("enterprise plan");
        assert_eq!(plan.unit_price, Decimal::new(25_000, 0));
    }

    #[test]
    fn segment_lookup_is_scoped_to_the_catalog() {
        assert!(Catalog::workforce().find_segment(SegmentId::Small).is_ok());
        assert_eq!(
            Catalog::workforce().find_segment(SegmentId::Otas),
            Err(DomainError::UnknownSegment("otas".to_string()))
        );
    }

    #[test]
    fn every_segment_has_parallel_copy() {
        for kind in [CatalogKind::Workforce, CatalogKind::Mobility] {
            for segment in Catalog::get(kind).segments() {
                assert_eq!(segment.pain_points.len(), segment.benefits.len(), "{:?}", segment.id);
            }
        }
    }

    #[test]
    fn catalog_kind_parses_from_config_strings() {
        assert_eq!("Mobility".parse::<CatalogKind>(), Ok(CatalogKind::Mobility));
        assert!("retail".parse::<CatalogKind>().is_err());
    }
}
