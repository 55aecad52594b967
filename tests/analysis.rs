//! End-to-end stage runs against a scripted model.

use async_trait::async_trait;
use legible::prompt::PromptBuilder;
use legible::{
    AgentError, Analyzer, DocumentContext, DocumentFormat, Language, PreconditionError, SafetyLevel, Severity,
    TextGenerator,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Hands out queued replies in order and records the prompts it was sent
#[derive(Default)]
struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, AgentError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn with_replies(replies: Vec<Result<&str, AgentError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::RequestFailed("no scripted reply left".to_string())))
    }
}

fn penalty_clause() -> DocumentContext {
    DocumentContext::new("Late payments incur a 5% penalty.", DocumentFormat::Pdf, 1)
}

const PENALTY_REPLY: &str = r#"Here is my analysis of the document.

```json
{
  "risks": [
    {
      "type": "Penalty",
      "description": "Paying late adds a 5% charge to the amount due.",
      "severity": "High",
      "excerpt": "Late payments incur a 5% penalty."
    }
  ],
  "total_risks": 3,
  "high_risk_count": 0
}
```

Let me know if you need anything else."#;

#[tokio::test]
async fn penalty_clause_is_reported_verbatim() {
    let analyzer = Analyzer::new(ScriptedModel::with_replies(vec![Ok(PENALTY_REPLY)]));
    let report = analyzer.detect_risks(&penalty_clause(), Language::english()).await;

    assert!(!report.is_degraded());
    assert_eq!(report.risks().len(), 1);
    let risk = &report.risks()[0];
    assert_eq!(risk.risk_type, "Penalty");
    assert_eq!(risk.description, "Paying late adds a 5% charge to the amount due.");
    assert_eq!(risk.severity, Severity::High);
    assert_eq!(risk.excerpt, "Late payments incur a 5% penalty.");

    assert_eq!(report.total_risks(), 1);
    assert_eq!(report.high_risk_count(), 1);
    assert_eq!(report.medium_risk_count(), 0);
    assert_eq!(report.low_risk_count(), 0);
    assert_eq!(report.language(), Language::english());
}

#[tokio::test]
async fn full_sequence_threads_risks_into_safety() {
    let analyzer = Analyzer::new(ScriptedModel::with_replies(vec![
        Ok(r#"{"summary": "A payment agreement.", "key_points": ["Pay on time"], "parties": ["Customer"]}"#),
        Ok(PENALTY_REPLY),
        Ok(r#"{"safety_level": "WARNING", "recommendation": "Negotiate the penalty.", "suggestions": ["Cap the late fee"]}"#),
    ]));
    let doc = penalty_clause();
    let english = Language::english();

    let summary = analyzer.summarize(&doc, english).await;
    assert_eq!(summary.summary, "A payment agreement.");
    assert_eq!(summary.key_points, vec!["Pay on time".to_string()]);
    assert!(summary.important_dates.is_empty());

    let report = analyzer.detect_risks(&doc, english).await;
    let recommendation = analyzer
        .recommend_safety(&doc, Some(&report), english)
        .await
        .unwrap();
    assert_eq!(recommendation.safety_level, SafetyLevel::Warning);
    assert_eq!(recommendation.recommendation, "Negotiate the penalty.");
    assert!(recommendation.reasons.is_empty());
    assert_eq!(recommendation.suggestions, vec!["Cap the late fee".to_string()]);
}

#[tokio::test]
async fn safety_prompt_carries_the_risk_report() {
    let model = ScriptedModel::with_replies(vec![Ok(PENALTY_REPLY), Ok("{}")]);
    let analyzer = Analyzer::new(model);
    let doc = penalty_clause();

    let report = analyzer.detect_risks(&doc, Language::english()).await;
    analyzer
        .recommend_safety(&doc, Some(&report), Language::english())
        .await
        .unwrap();

    let prompts = analyzer_prompts(&analyzer);
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("- Total risks: 1"));
    assert!(prompts[1].contains("- High risk: 1"));
    assert!(prompts[1].contains("\"excerpt\": \"Late payments incur a 5% penalty.\""));
}

#[tokio::test]
async fn missing_report_is_distinct_from_degradation() {
    let analyzer = Analyzer::new(ScriptedModel::default());
    let err = analyzer
        .recommend_safety(&penalty_clause(), None, Language::english())
        .await
        .unwrap_err();
    assert_eq!(err, PreconditionError::MissingRiskReport);
}

#[tokio::test]
async fn failed_risk_stage_cannot_yield_safe() {
    let analyzer = Analyzer::new(ScriptedModel::with_replies(vec![
        Err(AgentError::RequestFailed("connection reset".to_string())),
        Ok(r#"{"safety_level": "SAFE", "recommendation": "Go ahead and sign."}"#),
    ]));
    let doc = penalty_clause();

    let report = analyzer.detect_risks(&doc, Language::english()).await;
    let recommendation = analyzer
        .recommend_safety(&doc, Some(&report), Language::english())
        .await
        .unwrap();

    assert_eq!(recommendation.safety_level, SafetyLevel::Warning);
    assert!(recommendation.is_degraded());
    assert!(recommendation.error.unwrap().contains("connection reset"));
    assert_eq!(analyzer_prompts(&analyzer).len(), 1);
}

#[tokio::test]
async fn every_stage_survives_model_failure() {
    let analyzer = Analyzer::new(ScriptedModel::default());
    let doc = penalty_clause();
    let hindi = Language::from_name("Hindi").unwrap();

    let summary = analyzer.summarize(&doc, hindi).await;
    assert!(summary.is_degraded());
    assert_eq!(summary.language, hindi);

    let report = analyzer.detect_risks(&doc, hindi).await;
    assert!(report.is_degraded());
    assert_eq!(report.total_risks(), 0);

    let recommendation = analyzer.recommend_safety(&doc, Some(&report), hindi).await.unwrap();
    assert_eq!(recommendation.safety_level, SafetyLevel::Warning);
    assert!(recommendation.is_degraded());

    let answer = analyzer.answer("Is there a penalty?", &doc, hindi).await;
    assert!(answer.text.contains("no scripted reply left"));
}

#[tokio::test]
async fn long_documents_are_cut_to_the_stage_budget() {
    let text = "A".repeat(120) + "B";
    let doc = DocumentContext::new(text, DocumentFormat::Docx, 2);
    let model = ScriptedModel::with_replies(vec![Ok("{}"), Ok("answer")]);
    let analyzer = Analyzer::with_prompts(model, PromptBuilder::new(100, 40));

    analyzer.summarize(&doc, Language::english()).await;
    analyzer.answer("What?", &doc, Language::english()).await;

    let prompts = analyzer_prompts(&analyzer);
    assert!(prompts[0].contains(&format!("\n{}\n", "A".repeat(100))));
    assert!(!prompts[0].contains(&"A".repeat(101)));
    assert!(prompts[1].contains(&format!("\n{}\n", "A".repeat(40))));
    assert!(!prompts[1].contains(&"A".repeat(41)));
}

fn analyzer_prompts(analyzer: &Analyzer<ScriptedModel>) -> Vec<String> {
    analyzer.generator().prompts()
}
