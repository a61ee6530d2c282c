use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentId {
    Startups,
    Small,
    Medium,
    Large,
    SuperApps,
    Otas,
    Wholesalers,
    Gds,
}

impl SegmentId {
    pub const ALL: [SegmentId; 8] = [
        Self::Startups,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::SuperApps,
        Self::Otas,
        Self::Wholesalers,
        Self::Gds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startups => "startups",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::SuperApps => "super-apps",
            Self::Otas => "otas",
            Self::Wholesalers => "wholesalers",
            Self::Gds => "gds",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|segment| segment.as_str() == normalized)
            .ok_or(DomainError::UnknownSegment(normalized))
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named customer category with its marketing copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub display_name: String,
    pub value_proposition: String,
    pub pain_points: Vec<String>,
    pub benefits: Vec<String>,
}
