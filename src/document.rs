//! Document context - the unit of analysis handed to every stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source format of an extracted document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Resolve a format from a file name's extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// What `page_or_paragraph_count` counts for this format
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Pdf => "pages",
            Self::Docx => "paragraphs",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "PDF"),
            Self::Docx => write!(f, "DOCX"),
        }
    }
}

/// Extracted text plus basic metadata from one uploaded document.
///
/// The text is expected to be plain and already normalized; no stage
/// performs further cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentContext {
    pub text: String,
    pub word_count: usize,
    pub format: DocumentFormat,
    /// Pages for PDF, non-empty paragraphs for DOCX
    pub page_or_paragraph_count: usize,
}

impl DocumentContext {
    /// Create a context, counting whitespace-separated words in `text`
    pub fn new(text: impl Into<String>, format: DocumentFormat, page_or_paragraph_count: usize) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self {
            text,
            word_count,
            format,
            page_or_paragraph_count,
        }
    }

    /// Check if the document has any text at all
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
