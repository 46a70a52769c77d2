//! Vector index over clause embeddings

mod entity;
mod store;

pub use entity::VectorIndex;
pub use store::VectorIndexStore;
