//! Infrastructure layer - External service implementations

pub mod embedding;
pub mod extraction;
pub mod generation;
pub mod http;
pub mod ingestion;
pub mod logging;
pub mod persistence;
pub mod services;
pub mod session;
