//! Mathematical utilities: stabilized least squares and scalar diagnostics.

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
