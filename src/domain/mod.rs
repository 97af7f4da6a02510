//! Shared domain types for the identification pipeline.

pub mod types;

pub use types::*;
