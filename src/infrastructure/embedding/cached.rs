//! Embedding provider wrapper that caches vectors per input text

use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

/// Embedding provider wrapper that adds an in-memory cache with TTL.
///
/// Query texts repeat heavily across question batches; vectors for a
/// given model never change, so a plain text key is sufficient.
#[derive(Debug)]
pub struct CachedEmbeddingProvider<P: EmbeddingProvider> {
    inner: P,
    cache: Cache<String, Arc<Vec<f32>>>,
}

impl<P: EmbeddingProvider> CachedEmbeddingProvider<P> {
    pub fn new(inner: P, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity)
            .build();

        Self { inner, cache }
    }

    pub fn cache_size(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl<P: EmbeddingProvider> EmbeddingProvider for CachedEmbeddingProvider<P> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        if let Some(cached) = self.cache.get(text).await {
            tracing::debug!(provider = self.inner.provider_name(), "embedding cache hit");
            return Ok((*cached).clone());
        }

        let vector = self.inner.embed(text).await?;
        self.cache
            .insert(text.to_string(), Arc::new(vector.clone()))
            .await;
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
        // batches run once per document build; not worth caching per entry
        self.inner.embed_batch(texts).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn dimensions(&self) -> Option<usize> {
        self.inner.dimensions()
    }
}
