//! Clause entities

mod entity;

pub use entity::{Clause, ClauseId};
