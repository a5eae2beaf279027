//! Domain layer types and invariants.

pub mod courses;
pub mod entities;
pub mod error;
pub mod types;
