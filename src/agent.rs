//! LLM agent module: the model seam and the stage orchestrator.
//!
//! [`Analyzer`] runs each stage as build prompt → one model call →
//! interpret → aggregate. Model and parsing failures never escape a stage;
//! they come back as degraded records. The only `Err` a caller sees is a
//! [`PreconditionError`], which signals misuse rather than a bad reply.

use crate::config::Config;
use crate::document::DocumentContext;
use crate::interpret::{try_extract_payload, InterpretError, Payload};
use crate::language::Language;
use crate::prompt::PromptBuilder;
use crate::report::{Answer, RiskReport, SafetyRecommendation, SummaryResult, Translation};
use async_trait::async_trait;
use rstructor::{GeminiClient, GeminiModel, LLMClient};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::Instrument;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("LLM request timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to parse response: {0}")]
    ParseError(#[from] InterpretError),
    #[error("configuration error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

/// Misuse of the stage sequence, reported instead of a degraded result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("a risk report is required before a safety recommendation; run risk detection first")]
    MissingRiskReport,
}

/// The analysis stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summary,
    Risks,
    Safety,
    Answer,
    Translation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Summary => "summary",
            Self::Risks => "risks",
            Self::Safety => "safety",
            Self::Answer => "answer",
            Self::Translation => "translation",
        };
        f.write_str(name)
    }
}

/// Generate text from an instruction string: one request, one reply.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError>;
}

/// Gemini-backed generator using rstructor
pub struct GeminiGenerator {
    client: GeminiClient,
    timeout: Duration,
}

impl GeminiGenerator {
    /// Build the client from the configured API key, model and timeout
    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        let api_key = config.api_key()?;

        // Parse the model from config
        let model = parse_gemini_model(&config.agent.model);

        let client = GeminiClient::new(api_key)
            .map_err(|e| AgentError::RequestFailed(e.to_string()))?
            .model(model);

        Ok(Self {
            client,
            timeout: config.request_timeout(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        let result = tokio::time::timeout(self.timeout, self.client.generate_with_metadata(prompt))
            .await
            .map_err(|_| AgentError::Timeout(self.timeout))?
            .map_err(|e| AgentError::RequestFailed(e.to_string()))?;
        Ok(result.text)
    }
}

/// Parse a model string into a GeminiModel
fn parse_gemini_model(model: &str) -> GeminiModel {
    match model {
        "gemini-2.0-flash" => GeminiModel::Gemini20Flash,
        "gemini-2.5-flash" => GeminiModel::Gemini25Flash,
        "gemini-2.5-pro" => GeminiModel::Gemini25Pro,
        other => {
            tracing::warn!(model = other, "unknown Gemini model, using gemini-2.0-flash");
            GeminiModel::Gemini20Flash
        }
    }
}

/// Runs analysis stages against an injected [`TextGenerator`].
///
/// Holds no per-call state; concurrent calls are independent.
pub struct Analyzer<G> {
    generator: G,
    prompts: PromptBuilder,
}

impl<G: TextGenerator> Analyzer<G> {
    pub fn new(generator: G) -> Self {
        Self::with_prompts(generator, PromptBuilder::default())
    }

    pub fn with_prompts(generator: G, prompts: PromptBuilder) -> Self {
        Self { generator, prompts }
    }

    /// Use the configured prompt budgets
    pub fn from_config(generator: G, config: &Config) -> Self {
        let prompts = PromptBuilder::new(
            config.analysis.document_chars,
            config.analysis.question_chars,
        );
        Self::with_prompts(generator, prompts)
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Summarize the document in plain language
    pub async fn summarize(&self, context: &DocumentContext, language: Language) -> SummaryResult {
        let prompt = self.prompts.summary(context, language);
        match self.structured(Stage::Summary, &prompt, language).await {
            Ok(payload) => SummaryResult::from_payload(&payload, language),
            Err(e) => SummaryResult::degraded(e.to_string(), language),
        }
    }

    /// Detect risky clauses; severity tallies are computed locally
    pub async fn detect_risks(&self, context: &DocumentContext, language: Language) -> RiskReport {
        let prompt = self.prompts.risks(context, language);
        match self.structured(Stage::Risks, &prompt, language).await {
            Ok(payload) => RiskReport::from_payload(&payload, language),
            Err(e) => RiskReport::degraded(e.to_string(), language),
        }
    }

    /// Recommend whether to sign, based on a previously produced risk report
    pub async fn recommend_safety(
        &self,
        context: &DocumentContext,
        risk_report: Option<&RiskReport>,
        language: Language,
    ) -> Result<SafetyRecommendation, PreconditionError> {
        let report = risk_report.ok_or(PreconditionError::MissingRiskReport)?;
        if let Some(error) = report.error() {
            tracing::warn!(error, "risk report is degraded, skipping safety request");
            return Ok(SafetyRecommendation::degraded(
                format!("risk analysis unavailable: {}", error),
                language,
            ));
        }
        let prompt = self.prompts.safety(context, report, language);
        let recommendation = match self.structured(Stage::Safety, &prompt, language).await {
            Ok(payload) => SafetyRecommendation::from_payload(&payload, language),
            Err(e) => SafetyRecommendation::degraded(e.to_string(), language),
        };
        Ok(recommendation)
    }

    /// Answer a free-form question using the document as context
    pub async fn answer(&self, question: &str, context: &DocumentContext, language: Language) -> Answer {
        let prompt = self.prompts.answer(question, context, language);
        match self.invoke(Stage::Answer, &prompt, language).await {
            Ok(reply) => Answer::new(&reply, language),
            Err(e) => Answer::degraded(e.to_string(), language),
        }
    }

    /// Translate arbitrary text into a supported language
    pub async fn translate(&self, text: &str, language: Language) -> Translation {
        let prompt = self.prompts.translation(text, language);
        match self.invoke(Stage::Translation, &prompt, language).await {
            Ok(reply) => Translation::new(&reply, language),
            Err(e) => Translation::degraded(e.to_string(), language),
        }
    }

    /// One model round trip, followed by payload extraction
    async fn structured(&self, stage: Stage, prompt: &str, language: Language) -> Result<Payload, AgentError> {
        let reply = self.invoke(stage, prompt, language).await?;
        try_extract_payload(&reply).map_err(|e| {
            tracing::warn!(%stage, error = %e, "could not interpret model reply");
            AgentError::from(e)
        })
    }

    async fn invoke(&self, stage: Stage, prompt: &str, language: Language) -> Result<String, AgentError> {
        let span = tracing::info_span!("stage", %stage, language = language.code());
        async {
            tracing::debug!(prompt_chars = prompt.chars().count(), "sending prompt");
            match self.generator.generate(prompt).await {
                Ok(reply) => {
                    tracing::info!(reply_chars = reply.chars().count(), "model replied");
                    Ok(reply)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "model request failed, returning degraded result");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}
