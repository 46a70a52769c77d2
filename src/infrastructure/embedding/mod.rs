//! Embedding provider implementations

mod cached;
mod openai;

pub use cached::CachedEmbeddingProvider;
pub use openai::{OpenAiEmbeddingProvider, DEFAULT_EMBEDDING_MODEL};
