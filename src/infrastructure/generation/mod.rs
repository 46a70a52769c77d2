//! Answer generation provider implementations

mod openai;

pub use openai::{OpenAiGenerationProvider, DEFAULT_GENERATION_MODEL};
