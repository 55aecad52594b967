//! Result records returned by every analysis stage.
//!
//! Each record is built from an interpreted [`Payload`] by a single
//! `from_payload` step that fills every absent field with a stage default,
//! so callers never see a missing field. Failed stages produce the same
//! shape through `degraded`, with the reason in `error`.

use crate::interpret::{field, items, Payload};
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SUMMARY_PLACEHOLDER: &str = "Summary not available";
pub const RECOMMENDATION_PLACEHOLDER: &str = "Please review the document carefully";
pub const UNSPECIFIED_RISK: &str = "Unspecified risk";

/// Plain-language summary of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub key_points: Vec<String>,
    pub important_dates: Vec<String>,
    pub parties: Vec<String>,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryResult {
    pub fn from_payload(payload: &Payload, language: Language) -> Self {
        Self {
            summary: field(payload, "summary").unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string()),
            key_points: items(payload, "key_points").unwrap_or_default(),
            important_dates: items(payload, "important_dates").unwrap_or_default(),
            parties: items(payload, "parties").unwrap_or_default(),
            language,
            error: None,
        }
    }

    pub fn degraded(error: impl Into<String>, language: Language) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::from_payload(&Payload::new(), language)
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// How serious a detected risk is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Parse a model-provided label. Unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// A single problematic clause found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskItem {
    #[serde(rename = "type")]
    pub risk_type: String,
    pub description: String,
    pub severity: Severity,
    pub excerpt: String,
}

impl RiskItem {
    /// Build an item from one entry of the model's `risks` array.
    ///
    /// Missing or unrecognized severities count as `Medium` so every item
    /// lands in exactly one tally.
    fn from_entry(entry: &Payload) -> Self {
        Self {
            risk_type: field(entry, "type").unwrap_or_else(|| UNSPECIFIED_RISK.to_string()),
            description: field(entry, "description").unwrap_or_default(),
            severity: field::<String>(entry, "severity")
                .and_then(|s| Severity::parse(&s))
                .unwrap_or(Severity::Medium),
            excerpt: field(entry, "excerpt").unwrap_or_default(),
        }
    }
}

/// All risks found in a document, with severity tallies.
///
/// The tallies are derived from `risks` on construction (and again on
/// deserialization) and cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RiskReportRecord")]
pub struct RiskReport {
    risks: Vec<RiskItem>,
    total_risks: usize,
    high_risk_count: usize,
    medium_risk_count: usize,
    low_risk_count: usize,
    language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Serialized form accepted on input; any counts present are ignored.
#[derive(Deserialize)]
struct RiskReportRecord {
    #[serde(default)]
    risks: Vec<RiskItem>,
    language: Language,
    #[serde(default)]
    error: Option<String>,
}

impl From<RiskReportRecord> for RiskReport {
    fn from(record: RiskReportRecord) -> Self {
        let mut report = Self::new(record.risks, record.language);
        report.error = record.error;
        report
    }
}

impl RiskReport {
    pub fn new(risks: Vec<RiskItem>, language: Language) -> Self {
        let count = |severity: Severity| risks.iter().filter(|r| r.severity == severity).count();
        Self {
            total_risks: risks.len(),
            high_risk_count: count(Severity::High),
            medium_risk_count: count(Severity::Medium),
            low_risk_count: count(Severity::Low),
            risks,
            language,
            error: None,
        }
    }

    /// Build a report from the payload, ignoring any counts the model claimed
    pub fn from_payload(payload: &Payload, language: Language) -> Self {
        let risks = items::<Payload>(payload, "risks")
            .unwrap_or_default()
            .iter()
            .map(RiskItem::from_entry)
            .collect();
        Self::new(risks, language)
    }

    pub fn degraded(error: impl Into<String>, language: Language) -> Self {
        let mut report = Self::new(Vec::new(), language);
        report.error = Some(error.into());
        report
    }

    pub fn risks(&self) -> &[RiskItem] {
        &self.risks
    }

    pub fn total_risks(&self) -> usize {
        self.total_risks
    }

    pub fn high_risk_count(&self) -> usize {
        self.high_risk_count
    }

    pub fn medium_risk_count(&self) -> usize {
        self.medium_risk_count
    }

    pub fn low_risk_count(&self) -> usize {
        self.low_risk_count
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Overall verdict on whether the document is safe to sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SafetyLevel {
    Safe,
    Warning,
    Danger,
}

impl SafetyLevel {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Some(Self::Safe),
            "WARNING" => Some(Self::Warning),
            "DANGER" => Some(Self::Danger),
            _ => None,
        }
    }
}

impl Default for SafetyLevel {
    /// Never `Safe`: an unknown verdict must still prompt a careful read.
    fn default() -> Self {
        Self::Warning
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "SAFE"),
            Self::Warning => write!(f, "WARNING"),
            Self::Danger => write!(f, "DANGER"),
        }
    }
}

/// Signing recommendation derived from a [`RiskReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyRecommendation {
    pub safety_level: SafetyLevel,
    pub recommendation: String,
    pub reasons: Vec<String>,
    pub suggestions: Vec<String>,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SafetyRecommendation {
    pub fn from_payload(payload: &Payload, language: Language) -> Self {
        Self {
            safety_level: field::<String>(payload, "safety_level")
                .and_then(|s| SafetyLevel::parse(&s))
                .unwrap_or_default(),
            recommendation: field(payload, "recommendation")
                .unwrap_or_else(|| RECOMMENDATION_PLACEHOLDER.to_string()),
            reasons: items(payload, "reasons").unwrap_or_default(),
            suggestions: items(payload, "suggestions").unwrap_or_default(),
            language,
            error: None,
        }
    }

    pub fn degraded(error: impl Into<String>, language: Language) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::from_payload(&Payload::new(), language)
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Answer to a free-form question about the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Answer {
    pub fn new(reply: &str, language: Language) -> Self {
        Self {
            text: reply.trim().to_string(),
            language,
            error: None,
        }
    }

    /// The error text itself becomes the answer body
    pub fn degraded(error: impl Into<String>, language: Language) -> Self {
        let error = error.into();
        Self {
            text: format!("Error answering question: {}", error),
            language,
            error: Some(error),
        }
    }
}

/// Text rendered into another supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub text: String,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Translation {
    pub fn new(reply: &str, language: Language) -> Self {
        Self {
            text: reply.trim().to_string(),
            language,
            error: None,
        }
    }

    pub fn degraded(error: impl Into<String>, language: Language) -> Self {
        let error = error.into();
        Self {
            text: format!("Translation error: {}", error),
            language,
            error: Some(error),
        }
    }
}
