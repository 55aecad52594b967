//! Prompt templates for each analysis stage.
//!
//! Every template is a pure function of its inputs. Document text is cut to a
//! fixed character budget before it is embedded, and stages that expect
//! structured output carry a JSON example of the shape to return.

use crate::document::DocumentContext;
use crate::language::Language;
use crate::report::RiskReport;

/// Character budget for document text in the summary, risk and safety prompts
pub const DEFAULT_DOCUMENT_CHARS: usize = 4000;
/// Character budget for document text used as question-answering context
pub const DEFAULT_QUESTION_CHARS: usize = 3000;

/// Left-anchored prefix of at most `max_chars` characters
pub fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Renders the instruction text sent to the model for each stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    document_chars: usize,
    question_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT_CHARS, DEFAULT_QUESTION_CHARS)
    }
}

impl PromptBuilder {
    pub fn new(document_chars: usize, question_chars: usize) -> Self {
        Self {
            document_chars,
            question_chars,
        }
    }

    pub fn summary(&self, context: &DocumentContext, language: Language) -> String {
        format!(
            r#"You are a legal document expert specializing in Indian legal documents. Analyze this legal document and provide:

1. A brief summary (2-3 sentences) in {language}
2. Key points in simple, plain language (5-7 bullet points) in {language}
3. Important dates, deadlines, or timeframes mentioned
4. Main parties involved

Respond in {language} using its native script, not a romanized transliteration.
Make the language simple and easy to understand for common people.

Document text:
{text}

Respond with JSON matching this shape:
{{
  "summary": "Brief summary here",
  "key_points": ["Point 1", "Point 2", "Point 3"],
  "important_dates": ["Date 1", "Date 2"],
  "parties": ["Party 1", "Party 2"]
}}"#,
            language = language,
            text = truncate(&context.text, self.document_chars),
        )
    }

    pub fn risks(&self, context: &DocumentContext, language: Language) -> String {
        format!(
            r#"You are an expert legal risk analyst specializing in Indian legal documents. Analyze this legal document thoroughly and identify potential risks from the meaning and context of its clauses.

Do not rely on simple keyword matching. Only report risks that are actually problematic.

Look for and analyze:
1. Penalty and fee structures - are they reasonable or excessive?
2. Data collection and sharing policies - what data is collected and how is it used?
3. Auto-renewal and subscription terms - are users properly informed?
4. Termination and cancellation clauses - are they fair to users?
5. Liability limitations and disclaimers - are they overly broad?
6. Unfair contract terms - any terms that heavily favor one party?
7. Hidden charges or fees - any costs not clearly disclosed?
8. Lock-in periods - are users trapped in contracts?

For each genuine risk provide:
- Risk type (be specific)
- Clear description in {language}
- Severity level (Low/Medium/High) based on actual impact
- The exact text excerpt that shows the risk

Respond in {language} using its native script, not a romanized transliteration.

Document text:
{text}

Respond with JSON matching this shape:
{{
  "risks": [
    {{
      "type": "Specific Risk Type",
      "description": "Clear description in {language}",
      "severity": "Low/Medium/High",
      "excerpt": "Exact text showing the risk"
    }}
  ]
}}"#,
            language = language,
            text = truncate(&context.text, self.document_chars),
        )
    }

    pub fn safety(&self, context: &DocumentContext, report: &RiskReport, language: Language) -> String {
        let risks = serde_json::to_string_pretty(report.risks()).unwrap_or_else(|_| "[]".to_string());
        format!(
            r#"You are a legal advisor providing safety recommendations for document signing. Based on the document and the detected risks, provide a clear recommendation.

Document risks summary:
- Total risks: {total}
- High risk: {high}
- Medium risk: {medium}
- Low risk: {low}

Detected risks:
{risks}

Provide a safety recommendation in {language} with:
1. Overall safety level (SAFE/WARNING/DANGER)
2. Clear recommendation (should they sign or not?)
3. Specific reasons based on the risks found
4. Specific clauses to negotiate or modify

Consider:
- High risk count indicates danger
- Medium risk count indicates caution needed
- Low risk count is generally acceptable
- Context and severity of individual risks

Respond in {language} using its native script, not a romanized transliteration.

Document text:
{text}

Respond with JSON matching this shape:
{{
  "safety_level": "SAFE/WARNING/DANGER",
  "recommendation": "Clear recommendation in {language}",
  "reasons": ["Reason 1", "Reason 2", "Reason 3"],
  "suggestions": ["Suggestion 1", "Suggestion 2"]
}}"#,
            total = report.total_risks(),
            high = report.high_risk_count(),
            medium = report.medium_risk_count(),
            low = report.low_risk_count(),
            risks = risks,
            language = language,
            text = truncate(&context.text, self.document_chars),
        )
    }

    pub fn answer(&self, question: &str, context: &DocumentContext, language: Language) -> String {
        format!(
            r#"You are a legal assistant specializing in Indian legal documents. Answer the following question about the legal document.
Base your answer on the document content provided.
Respond in {language} in a clear, simple manner.
Respond in {language} using its native script, not a romanized transliteration.
Make your answer easy to understand for common people.

Question: {question}

Document context:
{text}

Provide a direct, helpful answer based on the document content.
If the information is not available in the document, say so clearly."#,
            language = language,
            question = question.trim(),
            text = truncate(&context.text, self.question_chars),
        )
    }

    pub fn translation(&self, text: &str, language: Language) -> String {
        format!(
            r#"Translate the following text to {language}.
Maintain the original meaning and legal context.
Respond in {language} using its native script, not a romanized transliteration.
Make the translation simple and easy to understand for common people.
Return only the translated text without any additional formatting.

Text to translate:
{text}"#,
            language = language,
            text = text,
        )
    }
}
