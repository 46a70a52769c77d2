//! Lexical pattern extractor
//!
//! Pure pattern matching over clause text, no learned model. One linear
//! pass per clause collects defined terms, citations and override
//! markers; edge emission then works off those indexes.

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use super::entity::{Edge, EdgeType};
use super::extractor::EdgeExtractor;
use crate::domain::clause::{Clause, ClauseId};
use crate::domain::error::DomainError;

/// Confidence for an exact defined-term phrase match
const DEFINES_CONFIDENCE: f32 = 0.9;
/// Confidence for an explicit, resolvable citation
const REFERS_TO_CONFIDENCE: f32 = 0.95;
/// Confidence for an override relation inferred from markers
const OVERRIDES_CONFIDENCE: f32 = 0.7;
/// SameSection is a structural fact, not a heuristic
const SAME_SECTION_CONFIDENCE: f32 = 1.0;

static DEFINITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([A-Za-z][A-Za-z0-9 /-]{1,60}?)\s+(?:shall mean|means|is defined as)\b")
        .expect("definition pattern is valid")
});

static CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:clause|section)\s+([0-9]+(?:\.[0-9]+)*)")
        .expect("citation pattern is valid")
});

static SECTION_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([0-9]+(?:\.[0-9]+)*)").expect("section number pattern is valid")
});

const OVERRIDE_MARKERS: &[&str] = &["notwithstanding", "subject to", "except"];

/// Extract the terms a clause defines, via lexical definition patterns.
/// Leading articles are stripped; terms are lowercased for matching.
pub fn defined_terms(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = DEFINITION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let term = m.as_str().trim().to_lowercase();
            for article in ["the ", "a ", "an "] {
                if let Some(stripped) = term.strip_prefix(article) {
                    return stripped.to_string();
                }
            }
            term
        })
        .filter(|t| !t.is_empty())
        .collect();
    terms.sort();
    terms.dedup();
    terms
}

/// Explicit clause/section citations found in a clause text
/// (the numeric reference only, e.g. "4.2" from "clause 4.2")
pub fn citations(text: &str) -> Vec<String> {
    let mut refs: Vec<String> = CITATION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    refs.sort();
    refs.dedup();
    refs
}

fn has_override_marker(text: &str) -> bool {
    let lowered = text.to_lowercase();
    OVERRIDE_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Pattern-based edge extractor.
///
/// Emits `Defines`, `RefersTo`, `Overrides` and `SameSection` candidate
/// edges per the fixed heuristic confidences above. Deterministic for
/// identical input.
#[derive(Debug, Default, Clone)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Map citation references to clause IDs.
    ///
    /// A clause is addressable by its full section label (lowercased) and
    /// by the leading numbering token of that label. The first clause in
    /// document order claims a label.
    fn citation_index(clauses: &[Clause]) -> HashMap<String, ClauseId> {
        let mut index = HashMap::new();
        for clause in clauses {
            let Some(section) = clause.section() else {
                continue;
            };
            let label = section.trim().to_lowercase();
            index.entry(label.clone()).or_insert_with(|| clause.id().clone());
            if let Some(caps) = SECTION_NUMBER_RE.captures(&label) {
                let number = caps[1].to_string();
                index.entry(number).or_insert_with(|| clause.id().clone());
            }
        }
        index
    }

    fn defines_edges(clauses: &[Clause]) -> Vec<Edge> {
        let mut edges = Vec::new();
        for owner in clauses {
            let terms = defined_terms(owner.text());
            if terms.is_empty() {
                continue;
            }
            for user in clauses {
                if user.id() == owner.id() {
                    continue;
                }
                if terms.iter().any(|term| user.text_contains(term)) {
                    edges.push(Edge::new(
                        owner.id().clone(),
                        user.id().clone(),
                        EdgeType::Defines,
                        DEFINES_CONFIDENCE,
                    ));
                }
            }
        }
        edges
    }

    fn refers_to_edges(
        clauses: &[Clause],
        citation_index: &HashMap<String, ClauseId>,
    ) -> Vec<Edge> {
        let mut edges = Vec::new();
        for clause in clauses {
            for reference in citations(clause.text()) {
                if let Some(target) = citation_index.get(&reference) {
                    if target != clause.id() {
                        edges.push(Edge::new(
                            clause.id().clone(),
                            target.clone(),
                            EdgeType::RefersTo,
                            REFERS_TO_CONFIDENCE,
                        ));
                    }
                }
            }
        }
        edges
    }

    /// An exception clause overrides a base clause it cites, or a
    /// same-section base rule. Definition clauses are never override
    /// targets: an exception carves out a rule, not a definition, so a
    /// defining clause sharing the section does not qualify as the base.
    fn overrides_edges(
        clauses: &[Clause],
        citation_index: &HashMap<String, ClauseId>,
    ) -> Vec<Edge> {
        let mut edges = Vec::new();
        for exception in clauses {
            if !has_override_marker(exception.text()) {
                continue;
            }

            let cited: Vec<ClauseId> = citations(exception.text())
                .iter()
                .filter_map(|r| citation_index.get(r))
                .filter(|id| *id != exception.id())
                .cloned()
                .collect();

            if !cited.is_empty() {
                for base in cited {
                    edges.push(Edge::new(
                        exception.id().clone(),
                        base,
                        EdgeType::Overrides,
                        OVERRIDES_CONFIDENCE,
                    ));
                }
                continue;
            }

            for base in clauses {
                if base.id() == exception.id() {
                    continue;
                }
                let same_section = match (exception.section(), base.section()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                };
                if same_section && defined_terms(base.text()).is_empty() {
                    edges.push(Edge::new(
                        exception.id().clone(),
                        base.id().clone(),
                        EdgeType::Overrides,
                        OVERRIDES_CONFIDENCE,
                    ));
                }
            }
        }
        edges
    }

    fn same_section_edges(clauses: &[Clause]) -> Vec<Edge> {
        let mut by_section: HashMap<&str, Vec<&Clause>> = HashMap::new();
        for clause in clauses {
            if let Some(section) = clause.section() {
                by_section.entry(section).or_default().push(clause);
            }
        }

        let mut edges = Vec::new();
        for members in by_section.values() {
            for (i, a) in members.iter().enumerate() {
                for b in members.iter().skip(i + 1) {
                    // symmetric relation stored as two directed edges
                    edges.push(Edge::new(
                        a.id().clone(),
                        b.id().clone(),
                        EdgeType::SameSection,
                        SAME_SECTION_CONFIDENCE,
                    ));
                    edges.push(Edge::new(
                        b.id().clone(),
                        a.id().clone(),
                        EdgeType::SameSection,
                        SAME_SECTION_CONFIDENCE,
                    ));
                }
            }
        }
        edges
    }
}

#[async_trait]
impl EdgeExtractor for PatternExtractor {
    fn extractor_name(&self) -> &'static str {
        "pattern"
    }

    async fn extract(&self, clauses: &[Clause]) -> Result<Vec<Edge>, DomainError> {
        let citation_index = Self::citation_index(clauses);

        let mut edges = Self::defines_edges(clauses);
        edges.extend(Self::refers_to_edges(clauses, &citation_index));
        edges.extend(Self::overrides_edges(clauses, &citation_index));
        edges.extend(Self::same_section_edges(clauses));
        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(n: usize, text: &str, section: &str) -> Clause {
        Clause::new(ClauseId::sequential(n), text).with_section(section)
    }

    fn id(n: usize) -> ClauseId {
        ClauseId::sequential(n)
    }

    async fn extract(clauses: &[Clause]) -> Vec<Edge> {
        PatternExtractor::new().extract(clauses).await.unwrap()
    }

    fn edges_of(edges: &[Edge], edge_type: EdgeType) -> Vec<&Edge> {
        edges.iter().filter(|e| e.edge_type() == edge_type).collect()
    }

    #[test]
    fn test_defined_terms_patterns() {
        assert_eq!(
            defined_terms("Grace period means 30 days"),
            vec!["grace period"]
        );
        assert_eq!(
            defined_terms("The Insured Person shall mean the policyholder"),
            vec!["insured person"]
        );
        assert_eq!(
            defined_terms("Hospital is defined as an institution"),
            vec!["hospital"]
        );
        assert!(defined_terms("Premium must be paid monthly").is_empty());
    }

    #[test]
    fn test_citations_patterns() {
        assert_eq!(citations("as provided in clause 4.2"), vec!["4.2"]);
        assert_eq!(
            citations("see Section 3 and Clause 4.2"),
            vec!["3", "4.2"]
        );
        assert!(citations("no references here").is_empty());
    }

    #[tokio::test]
    async fn test_defines_links_definition_to_users() {
        let clauses = vec![
            clause(1, "Grace period means 30 days", "S1"),
            clause(2, "Premium must be paid within the grace period", "S2"),
            clause(3, "Unrelated exclusion text", "S3"),
        ];
        let edges = extract(&clauses).await;
        let defines = edges_of(&edges, EdgeType::Defines);

        assert_eq!(defines.len(), 1);
        assert_eq!(defines[0].source(), &id(1));
        assert_eq!(defines[0].target(), &id(2));
        assert!((defines[0].confidence() - 0.9).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_refers_to_resolves_section_citations() {
        let clauses = vec![
            clause(1, "Payment terms apply", "4.2"),
            clause(2, "As provided in clause 4.2, payment is monthly", "5"),
        ];
        let edges = extract(&clauses).await;
        let refers = edges_of(&edges, EdgeType::RefersTo);

        assert_eq!(refers.len(), 1);
        assert_eq!(refers[0].source(), &id(2));
        assert_eq!(refers[0].target(), &id(1));
        assert!((refers[0].confidence() - 0.95).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_unresolvable_citation_emits_nothing() {
        let clauses = vec![clause(1, "see clause 9.9 for details", "S1")];
        let edges = extract(&clauses).await;
        assert!(edges_of(&edges, EdgeType::RefersTo).is_empty());
    }

    #[tokio::test]
    async fn test_overrides_prefers_cited_base() {
        let clauses = vec![
            clause(1, "Base payment rule", "4.2"),
            clause(2, "Another rule in the same section", "5"),
            clause(3, "Notwithstanding clause 4.2, waived for minors", "5"),
        ];
        let edges = extract(&clauses).await;
        let overrides = edges_of(&edges, EdgeType::Overrides);

        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].source(), &id(3));
        assert_eq!(overrides[0].target(), &id(1));
    }

    #[tokio::test]
    async fn test_overrides_same_section_skips_definition_clauses() {
        // spec scenario: the only same-section companion is a definition,
        // so no Overrides edge is emitted
        let clauses = vec![
            clause(1, "Grace period means 30 days", "S1"),
            clause(
                2,
                "Premium must be paid within the grace period, except for lapsed policies",
                "S1",
            ),
        ];
        let edges = extract(&clauses).await;
        assert!(edges_of(&edges, EdgeType::Overrides).is_empty());

        // Defines and SameSection still appear
        assert_eq!(edges_of(&edges, EdgeType::Defines).len(), 1);
        assert_eq!(edges_of(&edges, EdgeType::SameSection).len(), 2);
    }

    #[tokio::test]
    async fn test_overrides_same_section_base_rule() {
        let clauses = vec![
            clause(1, "Premium is payable quarterly", "S2"),
            clause(2, "Except for lapsed policies, no claims are admissible", "S2"),
        ];
        let edges = extract(&clauses).await;
        let overrides = edges_of(&edges, EdgeType::Overrides);

        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].source(), &id(2));
        assert_eq!(overrides[0].target(), &id(1));
    }

    #[tokio::test]
    async fn test_same_section_emits_both_directions() {
        let clauses = vec![
            clause(1, "a", "S1"),
            clause(2, "b", "S1"),
            clause(3, "c", "S2"),
        ];
        let edges = extract(&clauses).await;
        let same = edges_of(&edges, EdgeType::SameSection);

        assert_eq!(same.len(), 2);
        assert!(same
            .iter()
            .any(|e| e.source() == &id(1) && e.target() == &id(2)));
        assert!(same
            .iter()
            .any(|e| e.source() == &id(2) && e.target() == &id(1)));
    }

    #[tokio::test]
    async fn test_extraction_is_deterministic() {
        let clauses = vec![
            clause(1, "Grace period means 30 days, see clause 4.2", "4.2"),
            clause(2, "Pay within the grace period", "4.2"),
            clause(3, "Notwithstanding clause 4.2, exclusions apply", "5"),
        ];
        let a = extract(&clauses).await;
        let b = extract(&clauses).await;
        assert_eq!(a, b);
    }
}
