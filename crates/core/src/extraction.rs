//! Deterministic extraction of [`ClientFacts`] from free-text meeting transcripts.
//!
//! Every field owns an ordered list of pattern rules. Rules are tried top to bottom
//! and the first one that matches wins; when none match, the field takes its
//! documented default and an [`ExtractionNotice`] records the fallback.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cpq::segmentation::SegmentClassifier;
use crate::domain::client::{ClientFacts, Region, MAX_FACT_ITEMS};
use crate::errors::ApplicationError;

pub const DEFAULT_COMPANY_NAME: &str = "Generic Client";
pub const DEFAULT_CONTACT_NAME: &str = "Client Contact";
pub const DEFAULT_EMPLOYEE_COUNT: u64 = 50;
pub const DEFAULT_REGION: Region = Region::Global;

pub const PAIN_POINT_KEYWORDS: &[&str] = &[
    "problema",
    "dificuldade",
    "desafio",
    "dor",
    "problemas",
    "lento",
    "demorado",
    "complicado",
    "difícil",
    "manual",
];

pub const REQUIREMENT_KEYWORDS: &[&str] = &[
    "precisamos",
    "queremos",
    "necessitamos",
    "requisito",
    "funcionalidade",
    "feature",
    "integração",
    "relatório",
];

/// One or more capitalized words, e.g. "Acme Transportes" or "João Silva".
const PROPER_NAME: &str = r"\p{Lu}[\p{L}&'-]*(?:[ \t]+\p{Lu}[\p{L}&'-]*)*";
const COUNT: &str = r"\d{1,3}(?:[.,]\d{3})+|\d+";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedField {
    CompanyName,
    ContactName,
    ContactRole,
    EmployeeCount,
    Region,
}

impl ExtractedField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CompanyName => "company_name",
            Self::ContactName => "contact_name",
            Self::ContactRole => "contact_role",
            Self::EmployeeCount => "employee_count",
            Self::Region => "region",
        }
    }
}

/// Informational signal: a field fell back to its default. Never a failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionNotice {
    ExtractionDefaultUsed { field: ExtractedField },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub facts: ClientFacts,
    pub notices: Vec<ExtractionNotice>,
}

impl Extraction {
    pub fn used_default(&self, field: ExtractedField) -> bool {
        self.notices.contains(&ExtractionNotice::ExtractionDefaultUsed { field })
    }
}

/// Seam for the hosted structured-extraction collaborator. The deterministic
/// [`FieldExtractor`] is the built-in implementation.
#[async_trait]
pub trait FactsExtractor: Send + Sync {
    async fn extract_facts(&self, text: &str) -> Result<Extraction, ApplicationError>;
}

#[derive(Clone, Debug)]
pub struct PatternRule {
    pub name: &'static str,
    pattern: Regex,
}

impl PatternRule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self { name, pattern: compile(pattern) }
    }

    /// First capture group of the first match, trimmed.
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|found| found.as_str().trim())
            .filter(|found| !found.is_empty())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

#[derive(Clone, Debug)]
pub struct RegionRule {
    pub region: Region,
    rule: PatternRule,
}

#[derive(Clone, Debug)]
pub struct FieldExtractor {
    company_rules: Vec<PatternRule>,
    contact_rules: Vec<PatternRule>,
    role_rules: Vec<PatternRule>,
    count_rules: Vec<PatternRule>,
    region_rules: Vec<RegionRule>,
    classifier: SegmentClassifier,
}

static DEFAULT_EXTRACTOR: Lazy<FieldExtractor> = Lazy::new(FieldExtractor::new);

fn compile(pattern: &str) -> Regex {
    // Patterns are constants exercised by the tests below.
    Regex::new(pattern).expect("extraction rule patterns are valid")
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor {
    pub fn new() -> Self {
        let company_rules = vec![
            PatternRule::new(
                "empresa_name",
                &format!(r"(?i:\bempresa)\s+(?:(?i:é|e)\s+(?:(?i:a|o)\s+)?)?({PROPER_NAME})"),
            ),
            PatternRule::new("name_e_uma", &format!(r"({PROPER_NAME})\s+(?i:é\s+uma)\b")),
            PatternRule::new(
                "trabalhamos_na",
                &format!(r"(?i:\btrabalh(?:amos|o)\s+na)\s+({PROPER_NAME})"),
            ),
            PatternRule::new(
                "english_company",
                &format!(r"(?i:\b(?:company\s+is|work\s+at|we\s+are))\s+({PROPER_NAME})"),
            ),
        ];

        let contact_rules = vec![
            PatternRule::new("meu_nome_e", &format!(r"(?i:\bmeu\s+nome\s+é)\s+({PROPER_NAME})")),
            PatternRule::new("sou", &format!(r"(?i:\bsou)\s+(?:(?i:o|a)\s+)?({PROPER_NAME})")),
            PatternRule::new("name_responsavel", &format!(r"({PROPER_NAME}),\s+(?i:responsável)")),
            PatternRule::new("my_name_is", &format!(r"(?i:\bmy\s+name\s+is)\s+({PROPER_NAME})")),
        ];

        let role_rules = vec![
            PatternRule::new("meu_cargo", r"(?i)\bmeu\s+cargo\s+é\s+(?:de\s+)?([^,.;!?]+)"),
            PatternRule::new("atuo_como", r"(?i)\b(?:atuo|trabalho)\s+como\s+([^,.;!?]+)"),
            PatternRule::new("i_am_the", r"(?i)\bI\s+am\s+the\s+([^,.;!?]+)"),
        ];

        let count_rules = vec![
            PatternRule::new("funcionarios", &format!(r"(?i)({COUNT})\s+funcionários")),
            PatternRule::new("colaboradores", &format!(r"(?i)({COUNT})\s+colaboradores")),
            PatternRule::new("equipe_de", &format!(r"(?i)\bequipe\s+de\s+({COUNT})")),
            PatternRule::new("pessoas", &format!(r"(?i)({COUNT})\s+pessoas")),
            PatternRule::new("employees", &format!(r"(?i)({COUNT})\s+employees")),
        ];

        let region_rules = vec![
            RegionRule {
                region: Region::Apac,
                rule: PatternRule::new(
                    "apac",
                    r"(?i)\b(?:apac|ásia|asia|japão|japan|china|índia|india|austrália|australia|singapura|singapore)\b",
                ),
            },
            RegionRule {
                region: Region::Europe,
                rule: PatternRule::new(
                    "europe",
                    r"(?i)\b(?:europa|europe|portugal|espanha|spain|frança|france|alemanha|germany|itália|italy|reino\s+unido)\b",
                ),
            },
            RegionRule {
                region: Region::Americas,
                rule: PatternRule::new(
                    "americas",
                    r"(?i)\b(?:américas?|americas?|brasil|brazil|méxico|mexico|argentina|chile|colômbia|eua|estados\s+unidos|canadá|canada)\b",
                ),
            },
        ];

        Self {
            company_rules,
            contact_rules,
            role_rules,
            count_rules,
            region_rules,
            classifier: SegmentClassifier::workforce(),
        }
    }

    /// Shared instance built on first use.
    pub fn shared() -> &'static FieldExtractor {
        &DEFAULT_EXTRACTOR
    }

    pub fn extract(&self, text: &str) -> Extraction {
        let mut notices = Vec::new();
        let mut note_default = |field| notices.push(ExtractionNotice::ExtractionDefaultUsed { field });

        let company_name = first_capture(&self.company_rules, text).map(str::to_string);
        if company_name.is_none() {
            note_default(ExtractedField::CompanyName);
        }

        let contact_name = first_capture(&self.contact_rules, text).map(str::to_string);
        if contact_name.is_none() {
            note_default(ExtractedField::ContactName);
        }

        let contact_role = first_capture(&self.role_rules, text).map(str::to_string);
        if contact_role.is_none() {
            note_default(ExtractedField::ContactRole);
        }

        let employee_count = self.extract_count(text);
        if employee_count.is_none() {
            note_default(ExtractedField::EmployeeCount);
        }

        let region = self
            .region_rules
            .iter()
            .find(|candidate| candidate.rule.is_match(text))
            .map(|candidate| candidate.region);
        if region.is_none() {
            note_default(ExtractedField::Region);
        }

        let employee_count = employee_count.unwrap_or(DEFAULT_EMPLOYEE_COUNT);
        let facts = ClientFacts {
            company_name: company_name.unwrap_or_else(|| DEFAULT_COMPANY_NAME.to_string()),
            contact_name: contact_name.unwrap_or_else(|| DEFAULT_CONTACT_NAME.to_string()),
            contact_role,
            employee_count,
            region: region.unwrap_or(DEFAULT_REGION),
            segment: self.classifier.classify(employee_count),
            pain_points: sentences_with_keywords(text, PAIN_POINT_KEYWORDS),
            requirements: sentences_with_keywords(text, REQUIREMENT_KEYWORDS),
        };

        Extraction { facts, notices }
    }

    fn extract_count(&self, text: &str) -> Option<u64> {
        self.count_rules.iter().find_map(|rule| rule.capture(text).and_then(parse_count))
    }
}

#[async_trait]
impl FactsExtractor for FieldExtractor {
    async fn extract_facts(&self, text: &str) -> Result<Extraction, ApplicationError> {
        Ok(self.extract(text))
    }
}

fn first_capture<'t>(rules: &[PatternRule], text: &'t str) -> Option<&'t str> {
    rules.iter().find_map(|rule| rule.capture(text))
}

fn parse_count(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Splits on terminal punctuation and keeps, in order, up to three trimmed sentences
/// whose lowercase form contains any of `keywords`.
pub fn sentences_with_keywords(text: &str, keywords: &[&str]) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .filter(|sentence| {
            let lowered = sentence.to_lowercase();
            keywords.iter().any(|keyword| lowered.contains(keyword))
        })
        .take(MAX_FACT_ITEMS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        sentences_with_keywords, ExtractedField, FactsExtractor, FieldExtractor,
        DEFAULT_COMPANY_NAME, DEFAULT_CONTACT_NAME, DEFAULT_EMPLOYEE_COUNT, PAIN_POINT_KEYWORDS,
        REQUIREMENT_KEYWORDS,
    };
    use crate::domain::client::Region;
    use crate::domain::segment::SegmentId;

    const ACME: &str =
        "Minha empresa é Acme Transportes, temos 120 funcionários, o processo manual é muito lento";

    #[test]
    fn extracts_company_headcount_and_pain_point() {
        let extraction = FieldExtractor::new().extract(ACME);
        let facts = &extraction.facts;

        assert_eq!(facts.company_name, "Acme Transportes");
        assert_eq!(facts.employee_count, 120);
        assert_eq!(facts.segment, SegmentId::Small);
        assert_eq!(facts.pain_points.len(), 1);
        assert!(facts.pain_points[0].contains("lento"));
        assert!(facts.requirements.is_empty());
        assert!(!extraction.used_default(ExtractedField::CompanyName));
        assert!(extraction.used_default(ExtractedField::ContactName));
    }

    #[test]
    fn empty_text_yields_all_defaults() {
        let extraction = FieldExtractor::new().extract("");
        let facts = &extraction.facts;

        assert_eq!(facts.company_name, DEFAULT_COMPANY_NAME);
        assert_eq!(facts.contact_name, DEFAULT_CONTACT_NAME);
        assert_eq!(facts.contact_role, None);
        assert_eq!(facts.employee_count, DEFAULT_EMPLOYEE_COUNT);
        assert_eq!(facts.region, Region::Global);
        assert_eq!(facts.segment, SegmentId::Startups);
        assert!(facts.pain_points.is_empty());
        assert!(facts.requirements.is_empty());
        assert_eq!(extraction.notices.len(), 5);
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = FieldExtractor::new();
        let text = "Meu nome é Ana Souza. Trabalhamos na Beta Logística no Brasil. \
                    Precisamos de integração com a folha! Temos uma equipe de 800 pessoas.";
        assert_eq!(extractor.extract(text), extractor.extract(text));
        assert_eq!(FieldExtractor::shared().extract(text), extractor.extract(text));
    }

    #[test]
    fn contact_and_company_rules_fall_through_in_order() {
        let text = "Olá, meu nome é Ana Souza e trabalhamos na Beta Logística, \
                    somos uma equipe de 800 colaboradores no Brasil.";
        let facts = FieldExtractor::new().extract(text).facts;

        assert_eq!(facts.contact_name, "Ana Souza");
        assert_eq!(facts.company_name, "Beta Logística");
        assert_eq!(facts.employee_count, 800);
        assert_eq!(facts.segment, SegmentId::Medium);
        assert_eq!(facts.region, Region::Americas);
    }

    #[test]
    fn earlier_count_rules_take_precedence() {
        let text = "Somos 30 pessoas no escritório mas 1.200 funcionários no total.";
        let facts = FieldExtractor::new().extract(text).facts;
        assert_eq!(facts.employee_count, 1_200);
        assert_eq!(facts.segment, SegmentId::Large);
    }

    #[test]
    fn role_is_captured_until_punctuation() {
        let text = "Sou Carlos Lima, atuo como diretor de RH. A empresa Gamma é uma startup.";
        let facts = FieldExtractor::new().extract(text).facts;
        assert_eq!(facts.contact_name, "Carlos Lima");
        assert_eq!(facts.contact_role.as_deref(), Some("diretor de RH"));
        assert_eq!(facts.company_name, "Gamma");
    }

    #[test]
    fn english_phrasing_is_supported() {
        let text = "My name is Jane Doe and our company is Orbit Travel with 4500 employees in Europe.";
        let facts = FieldExtractor::new().extract(text).facts;
        assert_eq!(facts.contact_name, "Jane Doe");
        assert_eq!(facts.company_name, "Orbit Travel");
        assert_eq!(facts.employee_count, 4_500);
        assert_eq!(facts.region, Region::Europe);
    }

    #[test]
    fn keyword_sentences_keep_order_and_cap_at_three() {
        let text = "O onboarding é lento. Tudo é manual! Temos um problema com férias? \
                    O relatório mensal é difícil. Fora isso tudo bem.";
        let pains = sentences_with_keywords(text, PAIN_POINT_KEYWORDS);
        assert_eq!(
            pains,
            vec![
                "O onboarding é lento".to_string(),
                "Tudo é manual".to_string(),
                "Temos um problema com férias".to_string(),
            ]
        );

        let requirements = sentences_with_keywords(text, REQUIREMENT_KEYWORDS);
        assert_eq!(requirements, vec!["O relatório mensal é difícil".to_string()]);
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let found = sentences_with_keywords("PRECISAMOS de SSO. ok", REQUIREMENT_KEYWORDS);
        assert_eq!(found, vec!["PRECISAMOS de SSO".to_string()]);
    }

    #[tokio::test]
    async fn facts_extractor_trait_delegates_to_rules() {
        let extractor = FieldExtractor::new();
        let extraction = extractor.extract_facts(ACME).await.expect("never fails");
        assert_eq!(extraction.facts.company_name, "Acme Transportes");
    }
}
