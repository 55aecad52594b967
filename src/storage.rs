//! Sled-based session store for analysis results.
//!
//! Keeps the latest result of each stage per document, so a later run can
//! pick up where an earlier one stopped (the safety stage needs the risk
//! report from a previous risk run).

use crate::document::DocumentContext;
use crate::report::{RiskReport, SafetyRecommendation, SummaryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    DbError(#[from] sled::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Stage results stored for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    /// Fingerprint of the document text
    pub document: String,
    /// Display label, usually the file name
    pub label: String,
    /// When any result was last written
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub summary: Option<SummaryResult>,
    #[serde(default)]
    pub risks: Option<RiskReport>,
    #[serde(default)]
    pub safety: Option<SafetyRecommendation>,
}

impl StoredAnalysis {
    fn new(document: String, label: &str) -> Self {
        Self {
            document,
            label: label.to_string(),
            updated_at: Utc::now(),
            summary: None,
            risks: None,
            safety: None,
        }
    }
}

/// Session store keyed by document fingerprint.
pub struct SessionStore {
    db: sled::Db,
}

impl SessionStore {
    /// Open or create storage at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Retrieve everything stored for a document
    pub fn get(&self, context: &DocumentContext) -> Result<Option<StoredAnalysis>, StorageError> {
        let key = Self::fingerprint(context);
        match self.db.get(key.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// The risk report from an earlier run, if any
    pub fn risks(&self, context: &DocumentContext) -> Result<Option<RiskReport>, StorageError> {
        Ok(self.get(context)?.and_then(|stored| stored.risks))
    }

    pub fn store_summary(&self, context: &DocumentContext, label: &str, summary: &SummaryResult) -> Result<(), StorageError> {
        self.update(context, label, |stored| stored.summary = Some(summary.clone()))
    }

    /// Store a new risk report. Any safety recommendation based on an older
    /// report is dropped.
    pub fn store_risks(&self, context: &DocumentContext, label: &str, report: &RiskReport) -> Result<(), StorageError> {
        self.update(context, label, |stored| {
            stored.risks = Some(report.clone());
            stored.safety = None;
        })
    }

    pub fn store_safety(
        &self,
        context: &DocumentContext,
        label: &str,
        recommendation: &SafetyRecommendation,
    ) -> Result<(), StorageError> {
        self.update(context, label, |stored| stored.safety = Some(recommendation.clone()))
    }

    /// List all stored analyses
    pub fn list_all(&self) -> Result<Vec<StoredAnalysis>, StorageError> {
        let mut results = Vec::new();
        for item in self.db.iter() {
            let (_key, value) = item?;
            let stored: StoredAnalysis = serde_json::from_slice(&value)?;
            results.push(stored);
        }
        // Newest first
        results.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(results)
    }

    /// Delete everything stored for a document
    pub fn delete(&self, context: &DocumentContext) -> Result<bool, StorageError> {
        let key = Self::fingerprint(context);
        let existed = self.db.remove(key.as_bytes())?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    /// Get the number of stored documents
    pub fn count(&self) -> usize {
        self.db.len()
    }

    fn update<F>(&self, context: &DocumentContext, label: &str, apply: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut StoredAnalysis),
    {
        let key = Self::fingerprint(context);
        let mut stored = self
            .get(context)?
            .unwrap_or_else(|| StoredAnalysis::new(key.clone(), label));
        apply(&mut stored);
        stored.label = label.to_string();
        stored.updated_at = Utc::now();

        let value = serde_json::to_vec(&stored)?;
        self.db.insert(key.as_bytes(), value)?;
        self.db.flush()?;
        tracing::debug!(document = %key, "stored analysis");
        Ok(())
    }

    /// Create a hash of the document text for use as a key
    /// SHA-256 of the extracted text, hex encoded
    fn fingerprint(context: &DocumentContext) -> String {
        let digest = Sha256::digest(context.text.as_bytes());
        digest.iter().map(|byte| format!("{:02x}", byte)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFormat;
    use crate::language::Language;
    use crate::report::{RiskItem, Severity};

    fn context(text: &str) -> DocumentContext {
        DocumentContext::new(text, DocumentFormat::Pdf, 1)
    }

    fn report() -> RiskReport {
        RiskReport::new(
            vec![RiskItem {
                risk_type: "Penalty".to_string(),
                description: "Late fee".to_string(),
                severity: Severity::High,
                excerpt: "Late payments incur a 5% penalty.".to_string(),
            }],
            Language::english(),
        )
    }

    #[test]
    fn risk_report_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let ctx = context("Late payments incur a 5% penalty.");

        assert!(store.risks(&ctx).unwrap().is_none());
        store.store_risks(&ctx, "terms.pdf", &report()).unwrap();

        let loaded = store.risks(&ctx).unwrap().unwrap();
        assert_eq!(loaded, report());
        assert_eq!(loaded.high_risk_count(), 1);
        assert_eq!(store.count(), 1);
        assert!(store.risks(&context("another document")).unwrap().is_none());
    }

    #[test]
    fn new_risks_clear_stale_safety() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let ctx = context("doc");

        store.store_risks(&ctx, "doc.pdf", &report()).unwrap();
        store
            .store_safety(&ctx, "doc.pdf", &SafetyRecommendation::degraded("x", Language::english()))
            .unwrap();
        assert!(store.get(&ctx).unwrap().unwrap().safety.is_some());

        store.store_risks(&ctx, "doc.pdf", &report()).unwrap();
        let stored = store.get(&ctx).unwrap().unwrap();
        assert!(stored.safety.is_none());
        assert!(stored.risks.is_some());
    }

    #[test]
    fn fingerprint_is_stable_sha256() {
        assert_eq!(
            SessionStore::fingerprint(&context("abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        store
            .store_summary(&context("a"), "a.pdf", &SummaryResult::degraded("x", Language::english()))
            .unwrap();
        store.store_risks(&context("b"), "b.docx", &report()).unwrap();

        assert_eq!(store.list_all().unwrap().len(), 2);
        assert!(store.delete(&context("a")).unwrap());
        assert!(!store.delete(&context("a")).unwrap());
        assert_eq!(store.list_all().unwrap()[0].label, "b.docx");
    }
}
