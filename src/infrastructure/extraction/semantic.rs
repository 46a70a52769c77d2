//! LLM-backed entailment extractor
//!
//! Complements the pattern extractor with relations no surface pattern
//! can catch: one clause implying another without citing it. The model
//! is asked for a strict JSON verdict so parsing stays mechanical.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::domain::clause::Clause;
use crate::domain::generation::GenerationProvider;
use crate::domain::graph::{Edge, EdgeExtractor, EdgeType};
use crate::domain::DomainError;

/// Documents larger than this skip semantic extraction entirely rather
/// than producing a prompt the model cannot attend to.
const DEFAULT_MAX_CLAUSES: usize = 60;

#[derive(Debug)]
pub struct SemanticExtractor {
    provider: Arc<dyn GenerationProvider>,
    max_clauses: usize,
}

impl SemanticExtractor {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            provider,
            max_clauses: DEFAULT_MAX_CLAUSES,
        }
    }

    pub fn with_max_clauses(mut self, max_clauses: usize) -> Self {
        self.max_clauses = max_clauses;
        self
    }

    fn build_prompt(clauses: &[Clause]) -> String {
        let mut prompt = String::from(
            "You will be given numbered policy clauses. Identify pairs where one \
             clause logically entails or directly supports another without citing \
             it. Respond with a JSON array only, no prose. Each element: \
             {\"source\": <number>, \"target\": <number>, \"confidence\": <0..1>}. \
             Return [] if there are none.\n\n",
        );
        for (i, clause) in clauses.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, clause.text()));
        }
        prompt
    }

    fn parse_verdict(raw: &str) -> Result<Vec<EntailmentPair>, DomainError> {
        // models occasionally wrap JSON in a code fence
        let trimmed = raw
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();

        serde_json::from_str(trimmed).map_err(|e| {
            DomainError::provider(
                "semantic-extractor",
                format!("Unparseable entailment verdict: {}", e),
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct EntailmentPair {
    source: usize,
    target: usize,
    confidence: f32,
}

#[async_trait]
impl EdgeExtractor for SemanticExtractor {
    fn extractor_name(&self) -> &'static str {
        "semantic"
    }

    async fn extract(&self, clauses: &[Clause]) -> Result<Vec<Edge>, DomainError> {
        if clauses.len() > self.max_clauses {
            warn!(
                clauses = clauses.len(),
                limit = self.max_clauses,
                "document too large for semantic extraction, skipping"
            );
            return Ok(Vec::new());
        }
        if clauses.len() < 2 {
            return Ok(Vec::new());
        }

        let prompt = Self::build_prompt(clauses);
        let raw = self.provider.generate(&prompt).await?;
        let pairs = Self::parse_verdict(&raw)?;

        let mut edges = Vec::new();
        for pair in pairs {
            // the prompt numbers clauses from 1
            let (Some(source), Some(target)) = (
                pair.source.checked_sub(1).and_then(|i| clauses.get(i)),
                pair.target.checked_sub(1).and_then(|i| clauses.get(i)),
            ) else {
                warn!(
                    source = pair.source,
                    target = pair.target,
                    "verdict references clause outside the prompt"
                );
                continue;
            };
            if source.id() == target.id() {
                continue;
            }
            edges.push(Edge::new(
                source.id().clone(),
                target.id().clone(),
                EdgeType::Entails,
                pair.confidence,
            ));
        }
        Ok(edges)
    }
}
