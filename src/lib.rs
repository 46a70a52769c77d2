//! Clause Graph Query API
//!
//! Retrieval-augmented question answering over policy documents:
//! - Documents are fetched, cleaned and segmented into clauses
//! - Pattern (and optionally LLM) extractors link clauses into a typed graph
//! - Queries fuse dense similarity with graph expansion to pick evidence
//! - Answers are generated strictly from the selected clauses

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::graph::{EdgeExtractor, GraphBuilder, PatternExtractor};
use domain::generation::GenerationProvider;
use domain::retrieval::HybridRetriever;
use infrastructure::embedding::{CachedEmbeddingProvider, OpenAiEmbeddingProvider};
use infrastructure::extraction::SemanticExtractor;
use infrastructure::generation::OpenAiGenerationProvider;
use infrastructure::http::HttpClient;
use infrastructure::ingestion::{HttpFetcher, RegexSegmenter};
use infrastructure::services::{QueryService, QueryServiceDeps};
use infrastructure::session::SessionRegistry;
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable is required"))?;

    let client = HttpClient::with_timeout(Duration::from_secs(config.providers.timeout_secs))?;

    let embedder = Arc::new(CachedEmbeddingProvider::new(
        OpenAiEmbeddingProvider::new(
            client.clone(),
            api_key.clone(),
            config.providers.embedding_model.clone(),
        ),
        Duration::from_secs(config.providers.embedding_cache_ttl_secs),
        config.providers.embedding_cache_capacity,
    ));

    let generator: Arc<dyn GenerationProvider> = Arc::new(OpenAiGenerationProvider::new(
        client.clone(),
        api_key,
        config.providers.generation_model.clone(),
    ));

    let mut extractors: Vec<Arc<dyn EdgeExtractor>> = vec![Arc::new(PatternExtractor::new())];
    if config.graph.semantic_extraction {
        info!("Semantic entailment extraction enabled");
        extractors.push(Arc::new(
            SemanticExtractor::new(generator.clone())
                .with_max_clauses(config.graph.max_semantic_clauses),
        ));
    }

    let builder = GraphBuilder::new(extractors).with_min_confidence(config.graph.min_confidence);
    let retriever = HybridRetriever::new(config.retrieval.to_retrieval_config());

    let deps = QueryServiceDeps {
        fetcher: Arc::new(HttpFetcher::new(client)),
        segmenter: Arc::new(
            RegexSegmenter::new().with_min_clause_chars(config.ingestion.min_clause_chars),
        ),
        embedder,
        generator,
        builder,
        retriever,
    };

    let query_service = Arc::new(QueryService::new(
        deps,
        SessionRegistry::new(&config.data_dir),
    ));

    info!(data_dir = %config.data_dir, "Application state initialized");

    Ok(AppState {
        query_service,
        data_dir: config.data_dir.clone().into(),
    })
}
