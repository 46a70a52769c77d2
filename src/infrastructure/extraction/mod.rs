//! Edge extractor implementations backed by external services

mod semantic;

pub use semantic::SemanticExtractor;
