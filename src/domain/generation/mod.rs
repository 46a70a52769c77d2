//! Answer generation provider trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Trait for LLM answer generation
#[async_trait]
pub trait GenerationProvider: Send + Sync + Debug {
    /// Generate text for the given prompt
    async fn generate(&self, prompt: &str) -> Result<String, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock generation provider returning a fixed answer and recording prompts
    #[derive(Debug)]
    pub struct MockGenerationProvider {
        answer: String,
        error: Option<String>,
        prompts: Mutex<Vec<String>>,
        call_count: AtomicUsize,
    }

    impl MockGenerationProvider {
        pub fn new(answer: impl Into<String>) -> Self {
            Self {
                answer: answer.into(),
                error: None,
                prompts: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationProvider for MockGenerationProvider {
        async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }
            Ok(self.answer.clone())
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
