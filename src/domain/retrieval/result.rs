//! Per-query retrieval result types (ephemeral, never persisted)

use serde::{Deserialize, Serialize};

use crate::domain::clause::ClauseId;
use crate::domain::graph::EdgeType;

/// Functional category assigned to a retrieved clause for prompt
/// structuring. Context assembly groups clauses in the fixed order
/// Definition, BaseRule, Exception, Supporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseRole {
    Definition,
    BaseRule,
    Exception,
    Supporting,
}

impl ClauseRole {
    /// Context assembly order
    pub const CONTEXT_ORDER: [ClauseRole; 4] = [
        ClauseRole::Definition,
        ClauseRole::BaseRule,
        ClauseRole::Exception,
        ClauseRole::Supporting,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Definition => "Definitions",
            Self::BaseRule => "Base rules",
            Self::Exception => "Exceptions",
            Self::Supporting => "Supporting clauses",
        }
    }
}

/// The graph relation that pulled a non-seed clause into the evidence
/// set, kept for auditability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub edge_type: EdgeType,
    pub confidence: f32,
}

/// One selected clause with its fused score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedClause {
    pub clause_id: ClauseId,
    pub combined_score: f32,
    pub similarity: f32,
    pub role: ClauseRole,
    /// `None` for dense seeds; set for clauses added by graph expansion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

/// Ordered evidence set for one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    items: Vec<RetrievedClause>,
}

impl RetrievalResult {
    /// Empty result: dense search found nothing. The generation stage is
    /// expected to produce an explicit "insufficient evidence" answer.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(items: Vec<RetrievedClause>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Items in selection order (descending combined score)
    pub fn items(&self) -> &[RetrievedClause] {
        &self.items
    }

    /// Items grouped by role in context-assembly order; stable within a
    /// role by selection order.
    pub fn in_context_order(&self) -> Vec<&RetrievedClause> {
        ClauseRole::CONTEXT_ORDER
            .iter()
            .flat_map(|role| self.items.iter().filter(move |item| item.role == *role))
            .collect()
    }
}
