//! Query service - document build orchestration and question answering
//!
//! Ties the pipeline together: ensure a graph/index snapshot exists for
//! a document, then answer each question through retrieve-and-generate.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::generation::GenerationProvider;
use crate::domain::graph::GraphBuilder;
use crate::domain::index::VectorIndex;
use crate::domain::ingestion::{ClauseSegmenter, DocumentFetcher};
use crate::domain::retrieval::{ClauseRole, HybridRetriever, RetrievalResult};
use crate::domain::status::{IndexStatus, IndexStatusReporter};
use crate::domain::DomainError;
use crate::infrastructure::session::{DocumentSnapshot, SessionRegistry};

/// Answer returned when retrieval produces no evidence, and the reply
/// the model is instructed to give when the evidence is insufficient.
pub const NO_EVIDENCE_ANSWER: &str = "Not found in the policy document.";

/// Constructor dependencies, grouped to keep the signature readable
pub struct QueryServiceDeps {
    pub fetcher: Arc<dyn DocumentFetcher>,
    pub segmenter: Arc<dyn ClauseSegmenter>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: Arc<dyn GenerationProvider>,
    pub builder: GraphBuilder,
    pub retriever: HybridRetriever,
}

pub struct QueryService {
    fetcher: Arc<dyn DocumentFetcher>,
    segmenter: Arc<dyn ClauseSegmenter>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    builder: GraphBuilder,
    retriever: HybridRetriever,
    reporter: IndexStatusReporter,
    sessions: SessionRegistry,
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService").finish()
    }
}

impl QueryService {
    pub fn new(deps: QueryServiceDeps, sessions: SessionRegistry) -> Self {
        Self {
            fetcher: deps.fetcher,
            segmenter: deps.segmenter,
            embedder: deps.embedder,
            generator: deps.generator,
            builder: deps.builder,
            retriever: deps.retriever,
            reporter: IndexStatusReporter::new(),
            sessions,
        }
    }

    /// Answer a batch of questions against one document, building the
    /// graph and index first if this document was never processed.
    ///
    /// One answer per question, in input order. A collaborator failure
    /// on one question does not abort the rest of the batch.
    pub async fn answer_questions(
        &self,
        document_url: &str,
        questions: &[String],
        use_graph: bool,
    ) -> Result<Vec<String>, DomainError> {
        let snapshot = self.ensure_built(document_url).await?;

        let mut answers = Vec::with_capacity(questions.len());
        for question in questions {
            match self.answer_one(&snapshot, question, use_graph).await {
                Ok(answer) => answers.push(answer),
                Err(e) => {
                    error!(question, error = %e, "question failed");
                    answers.push(format!("Unable to answer this question: {}", e));
                }
            }
        }
        Ok(answers)
    }

    /// Statistics for an already-built document. Restores a persisted
    /// snapshot if present but never triggers a build.
    pub async fn status(&self, document_url: &str) -> Result<IndexStatus, DomainError> {
        let session = self.sessions.session(document_url).await;

        let snapshot = match session.current().await {
            Some(snapshot) => snapshot,
            None => session.restore().await?.ok_or_else(|| {
                DomainError::not_found(format!("no graph built for {}", document_url))
            })?,
        };

        Ok(self.reporter.report(&snapshot.graph, &snapshot.index))
    }

    /// Build (or rebuild) the snapshot for a document unconditionally
    pub async fn rebuild(&self, document_url: &str) -> Result<IndexStatus, DomainError> {
        let session = self.sessions.session(document_url).await;
        let _build = session.begin_build().await;
        let snapshot = self.build_snapshot(document_url, &session).await?;
        Ok(self.reporter.report(&snapshot.graph, &snapshot.index))
    }

    async fn ensure_built(&self, document_url: &str) -> Result<DocumentSnapshot, DomainError> {
        let session = self.sessions.session(document_url).await;

        if let Some(snapshot) = session.current().await {
            return Ok(snapshot);
        }

        let _build = session.begin_build().await;
        // another task may have finished while we waited for the lock
        if let Some(snapshot) = session.current().await {
            return Ok(snapshot);
        }

        if let Some(snapshot) = session.restore().await? {
            match self.reporter.verify(&snapshot.graph, &snapshot.index) {
                Ok(()) => {
                    info!(document_url, "restored persisted snapshot");
                    return Ok(snapshot);
                }
                Err(e) => warn!(document_url, error = %e, "persisted snapshot inconsistent, rebuilding"),
            }
        }

        self.build_snapshot(document_url, &session).await
    }

    async fn build_snapshot(
        &self,
        document_url: &str,
        session: &crate::infrastructure::session::DocumentSession,
    ) -> Result<DocumentSnapshot, DomainError> {
        info!(document_url, "building clause graph and vector index");

        let raw = self.fetcher.fetch(document_url).await?;
        let clauses = self.segmenter.segment(&raw)?;
        let graph = self.builder.build(clauses).await?;

        let texts: Vec<String> = graph.clauses().iter().map(|c| c.text().to_string()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != graph.clause_count() {
            return Err(DomainError::provider(
                self.embedder.provider_name(),
                format!(
                    "expected {} embeddings, got {}",
                    graph.clause_count(),
                    vectors.len()
                ),
            ));
        }

        let mut index = VectorIndex::new();
        for (clause, vector) in graph.clauses().iter().zip(vectors) {
            index.add(clause.id().clone(), vector)?;
        }

        // a completed build must leave graph and index in lockstep
        self.reporter.verify(&graph, &index)?;

        let snapshot = session.commit(graph, index).await?;
        info!(
            document_url,
            clauses = snapshot.graph.clause_count(),
            edges = snapshot.graph.edge_count(),
            "build complete"
        );
        Ok(snapshot)
    }

    async fn answer_one(
        &self,
        snapshot: &DocumentSnapshot,
        question: &str,
        use_graph: bool,
    ) -> Result<String, DomainError> {
        let result = self
            .retriever
            .retrieve(
                question,
                self.embedder.as_ref(),
                &snapshot.graph,
                &snapshot.index,
                use_graph,
            )
            .await?;

        if result.is_empty() {
            return Ok(NO_EVIDENCE_ANSWER.to_string());
        }

        let prompt = self.build_prompt(snapshot, &result, question);
        self.generator.generate(&prompt).await
    }

    fn build_prompt(
        &self,
        snapshot: &DocumentSnapshot,
        result: &RetrievalResult,
        question: &str,
    ) -> String {
        let mut prompt = String::from(
            "You answer questions about a policy document. Use only the clauses \
             below; do not invent facts. Answer in one or two sentences.\n",
        );

        let mut last_role: Option<ClauseRole> = None;
        for item in result.in_context_order() {
            if last_role != Some(item.role) {
                let _ = write!(prompt, "\n{}:\n", item.role.label());
                last_role = Some(item.role);
            }
            let Some(clause) = snapshot.graph.clause(&item.clause_id) else {
                continue;
            };
            match clause.section() {
                Some(section) => {
                    let _ = writeln!(prompt, "- [{}] {}", section, clause.text());
                }
                None => {
                    let _ = writeln!(prompt, "- {}", clause.text());
                }
            }
        }

        let _ = write!(
            prompt,
            "\nQuestion: {}\nIf the clauses do not contain the answer, reply exactly: {}",
            question, NO_EVIDENCE_ANSWER
        );
        prompt
    }
}
