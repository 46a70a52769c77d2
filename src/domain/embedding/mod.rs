//! Embedding provider trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Trait for embedding providers (OpenAI, etc.)
///
/// Dimensionality is fixed per deployment; the vector index rejects
/// mixed-dimension entries.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Embed a batch of texts, preserving input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Get the embedding dimensions, if known up front
    fn dimensions(&self) -> Option<usize>;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Deterministic mock provider: embeddings derived from a text hash
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        dimensions: usize,
        error: Option<String>,
    }

    impl MockEmbeddingProvider {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                error: None,
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        fn vector_for(&self, text: &str) -> Vec<f32> {
            let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
            (0..self.dimensions)
                .map(|i| ((hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0) - 0.5)
                .collect()
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }
            Ok(self.vector_for(text))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }
            Ok(texts.iter().map(|t| self.vector_for(t)).collect())
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }

        fn dimensions(&self) -> Option<usize> {
            Some(self.dimensions)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_embeddings_are_deterministic() {
            let provider = MockEmbeddingProvider::new(64);
            let a = provider.embed("grace period").await.unwrap();
            let b = provider.embed("grace period").await.unwrap();
            assert_eq!(a, b);
            assert_eq!(a.len(), 64);
        }

        #[tokio::test]
        async fn test_mock_batch_preserves_order() {
            let provider = MockEmbeddingProvider::new(16);
            let texts = vec!["one".to_string(), "two".to_string()];
            let batch = provider.embed_batch(&texts).await.unwrap();
            assert_eq!(batch.len(), 2);
            assert_eq!(batch[0], provider.embed("one").await.unwrap());
        }
    }
}
