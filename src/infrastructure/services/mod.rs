//! Infrastructure services

mod query_service;

pub use query_service::{QueryService, QueryServiceDeps, NO_EVIDENCE_ANSWER};
