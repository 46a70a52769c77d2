//! Regex-based clause segmenter
//!
//! Splits cleaned document text into clauses along structural headings.
//! Purely lexical; a clause is a run of lines between headings or blank
//! lines, labeled with the section it falls under.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::clause::{Clause, ClauseId};
use crate::domain::ingestion::{ClauseSegmenter, RawText};
use crate::domain::DomainError;

/// Fragments shorter than this are headings, footers or noise
const DEFAULT_MIN_CLAUSE_CHARS: usize = 50;

static PAGE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Page \d+ of \d+").expect("page marker pattern is valid"));

static BARE_NUMBER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\d+\s*$").expect("bare number pattern is valid"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("url pattern is valid"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+").expect("email pattern is valid"));

static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)POLICY DOCUMENT|TERMS AND CONDITIONS|©.*?All rights reserved|Confidential|Internal Use Only",
    )
    .expect("boilerplate pattern is valid")
});

static HYPHENATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)-\s*\n\s*(\w+)").expect("hyphenation pattern is valid"));

static SPACES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+").expect("spaces pattern is valid"));

/// A line opening a numbered clause, e.g. "4.2 Payment of premium"
static NUMBERED_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)*)[.)]?\s+\S").expect("numbered heading pattern is valid")
});

/// A standalone ALL CAPS heading line
static CAPS_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z\s]{3,}$").expect("caps heading pattern is valid"));

/// A "Section 4" / "Clause 4.2" marker line
static SECTION_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:Section|Clause)\s+(\d+(?:\.\d+)*)").expect("marker pattern is valid")
});

static LEADING_NUMBERING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[•\-\*]|\d+(?:\.\d+)*[.)]?)\s*").expect("numbering pattern is valid")
});

#[derive(Debug, Clone)]
pub struct RegexSegmenter {
    min_clause_chars: usize,
}

impl Default for RegexSegmenter {
    fn default() -> Self {
        Self {
            min_clause_chars: DEFAULT_MIN_CLAUSE_CHARS,
        }
    }
}

impl RegexSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_clause_chars(mut self, min_clause_chars: usize) -> Self {
        self.min_clause_chars = min_clause_chars;
        self
    }

    fn clean(text: &str) -> String {
        let text = PAGE_MARKER_RE.replace_all(text, "");
        let text = BARE_NUMBER_LINE_RE.replace_all(&text, "");
        let text = URL_RE.replace_all(&text, "");
        let text = EMAIL_RE.replace_all(&text, "");
        let text = BOILERPLATE_RE.replace_all(&text, "");
        let text = HYPHENATION_RE.replace_all(&text, "$1$2");
        SPACES_RE.replace_all(&text, " ").trim().to_string()
    }

    /// Cut the cleaned text into blocks. A block starts at a numbered
    /// heading, a Section/Clause marker, or after an ALL CAPS heading
    /// line; blank lines also separate blocks. The section label sticks
    /// until the next heading changes it.
    fn blocks(text: &str) -> Vec<(Option<String>, String)> {
        let mut blocks: Vec<(Option<String>, String)> = Vec::new();
        let mut section: Option<String> = None;
        let mut current: Vec<&str> = Vec::new();
        let mut current_section: Option<String> = None;

        let mut flush =
            |current: &mut Vec<&str>, block_section: &Option<String>| {
                if !current.is_empty() {
                    blocks.push((block_section.clone(), current.join(" ")));
                    current.clear();
                }
            };

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                flush(&mut current, &current_section);
                continue;
            }

            if CAPS_HEADING_RE.is_match(trimmed) {
                flush(&mut current, &current_section);
                section = Some(trimmed.to_string());
                continue;
            }

            let heading_number = NUMBERED_HEADING_RE
                .captures(trimmed)
                .or_else(|| SECTION_MARKER_RE.captures(trimmed))
                .map(|caps| caps[1].to_string());

            if let Some(number) = heading_number {
                flush(&mut current, &current_section);
                section = Some(number);
            }

            if current.is_empty() {
                current_section = section.clone();
            }
            current.push(trimmed);
        }
        flush(&mut current, &current_section);

        blocks
    }

    fn normalize(text: &str) -> String {
        let stripped = LEADING_NUMBERING_RE.replace(text, "");
        SPACES_RE.replace_all(&stripped, " ").trim().to_string()
    }
}

impl ClauseSegmenter for RegexSegmenter {
    fn segment(&self, raw: &RawText) -> Result<Vec<Clause>, DomainError> {
        if raw.is_empty() {
            return Err(DomainError::insufficient_input(format!(
                "no text extracted from {}",
                raw.source()
            )));
        }

        let cleaned = Self::clean(raw.text());
        let mut clauses = Vec::new();

        for (section, block) in Self::blocks(&cleaned) {
            let normalized = Self::normalize(&block);
            if normalized.graphemes(true).count() < self.min_clause_chars {
                continue;
            }

            let mut clause = Clause::new(ClauseId::sequential(clauses.len() + 1), normalized);
            if let Some(section) = section {
                clause = clause.with_section(section);
            }
            clauses.push(clause);
        }

        if clauses.is_empty() {
            return Err(DomainError::insufficient_input(format!(
                "no clauses of at least {} characters found in {}",
                self.min_clause_chars,
                raw.source()
            )));
        }

        Ok(clauses)
    }
}
