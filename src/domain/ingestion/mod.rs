//! Document acquisition and clause segmentation contracts
//!
//! Both are collaborators of the retrieval core: a fetcher produces raw
//! text from a document reference, a segmenter turns raw text into
//! clauses. The graph/index build pipeline consumes their output and is
//! agnostic to how it was produced.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::clause::Clause;
use crate::domain::error::DomainError;

/// Raw extracted text for one document
#[derive(Debug, Clone, PartialEq)]
pub struct RawText {
    text: String,
    source: String,
}

impl RawText {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Fetches a document by reference and extracts its raw text
#[async_trait]
pub trait DocumentFetcher: Send + Sync + Debug {
    async fn fetch(&self, url: &str) -> Result<RawText, DomainError>;
}

/// Splits raw document text into clauses with section labels
pub trait ClauseSegmenter: Send + Sync + Debug {
    fn segment(&self, raw: &RawText) -> Result<Vec<Clause>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Mock fetcher returning fixed text
    #[derive(Debug)]
    pub struct MockDocumentFetcher {
        text: String,
        error: Option<String>,
    }

    impl MockDocumentFetcher {
        pub fn new(text: impl Into<String>) -> Self {
            Self {
                text: text.into(),
                error: None,
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }
    }

    #[async_trait]
    impl DocumentFetcher for MockDocumentFetcher {
        async fn fetch(&self, url: &str) -> Result<RawText, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::provider("mock", error));
            }
            Ok(RawText::new(self.text.clone(), url))
        }
    }

    /// Mock segmenter returning fixed clauses
    #[derive(Debug)]
    pub struct MockClauseSegmenter {
        clauses: Vec<Clause>,
    }

    impl MockClauseSegmenter {
        pub fn new(clauses: Vec<Clause>) -> Self {
            Self { clauses }
        }
    }

    impl ClauseSegmenter for MockClauseSegmenter {
        fn segment(&self, _raw: &RawText) -> Result<Vec<Clause>, DomainError> {
            Ok(self.clauses.clone())
        }
    }
}
