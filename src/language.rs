//! Registry of supported output languages.
//!
//! Every stage writes its output in a [`Language`] taken from this fixed set.
//! Unknown names are rejected, never mapped to a fallback; picking one is up
//! to the caller.

use lazy_static::lazy_static;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Display name and ISO 639 code of every supported language
const SUPPORTED: &[(&str, &str)] = &[
    ("English", "en"),
    ("Hindi", "hi"),
    ("Bengali", "bn"),
    ("Telugu", "te"),
    ("Marathi", "mr"),
    ("Tamil", "ta"),
    ("Gujarati", "gu"),
    ("Kannada", "kn"),
    ("Malayalam", "ml"),
    ("Punjabi", "pa"),
    ("Odia", "or"),
    ("Assamese", "as"),
    ("Urdu", "ur"),
    ("Sanskrit", "sa"),
    ("Nepali", "ne"),
    ("Bhojpuri", "bh"),
];

lazy_static! {
    static ref REGISTRY: BTreeMap<&'static str, &'static str> = SUPPORTED.iter().copied().collect();
}

/// Check whether `name` is a supported language display name (case-sensitive)
pub fn validate(name: &str) -> bool {
    REGISTRY.contains_key(name)
}

/// All supported languages, display name to code
pub fn list() -> &'static BTreeMap<&'static str, &'static str> {
    &*REGISTRY
}

/// A validated output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Language {
    name: &'static str,
    code: &'static str,
}

impl Language {
    /// Look up a language by display name
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTRY
            .get_key_value(name)
            .map(|(name, code)| Self {
                name: *name,
                code: *code,
            })
    }

    pub fn english() -> Self {
        Self {
            name: "English",
            code: "en",
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::english()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::from_name(&name).ok_or_else(|| format!("unsupported language: {}", name))
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::try_from(name).map_err(serde::de::Error::custom)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.name.to_string()
    }
}
