//! # Legible
//!
//! Plain-language explanations of legal documents using LLMs.
//!
//! ## Features
//!
//! - **Staged analysis**: summary, risk detection, signing recommendation and Q&A
//! - **Always a usable result**: model or parsing failures come back as degraded records, not errors
//! - **Lenient parsing**: JSON payloads are dug out of whatever prose the model wraps them in
//! - **Local documents**: PDF and DOCX text extraction

pub mod agent;
pub mod config;
pub mod document;
pub mod extract;
pub mod interpret;
pub mod keywords;
pub mod language;
pub mod prompt;
pub mod report;
pub mod storage;

pub use agent::{AgentError, Analyzer, GeminiGenerator, PreconditionError, TextGenerator};
pub use config::Config;
pub use document::{DocumentContext, DocumentFormat};
pub use language::Language;
pub use report::{Answer, RiskItem, RiskReport, SafetyLevel, SafetyRecommendation, Severity, SummaryResult, Translation};
pub use storage::SessionStore;
