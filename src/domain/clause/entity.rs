//! Clause entity - the retrievable unit of document text

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Stable clause identifier, unique within one document build
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClauseId(String);

impl ClauseId {
    /// Create a new clause ID, validating that it is non-empty
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::validation("Clause ID cannot be empty"));
        }
        Ok(Self(id))
    }

    /// Create a sequential clause ID in document order (`clause-0001`, ...)
    pub fn sequential(position: usize) -> Self {
        Self(format!("clause-{:04}", position))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClauseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of retrievable text extracted from a policy document.
///
/// Immutable after creation within one build; a rebuild replaces the
/// clause set wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    id: ClauseId,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    section: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    terms: Vec<String>,
}

impl Clause {
    /// Create a new clause
    pub fn new(id: ClauseId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            section: None,
            terms: Vec::new(),
        }
    }

    /// Set the section path/label from the source structure
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        let section = section.into();
        if !section.trim().is_empty() {
            self.section = Some(section);
        }
        self
    }

    /// Set the defined/cited terms extracted from the text.
    /// Terms are deduplicated and kept sorted for deterministic output.
    pub fn with_terms(mut self, terms: Vec<String>) -> Self {
        let mut terms = terms;
        terms.sort();
        terms.dedup();
        self.terms = terms;
        self
    }

    pub fn id(&self) -> &ClauseId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Case-insensitive containment check used by term linking
    pub fn text_contains(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(&needle.to_lowercase())
    }
}
