//! Estimation pipeline: regression matrices, ERR/AIC structure selection,
//! the bi-objective Pareto sweep, and the correlation decision maker.

pub mod decision;
pub mod matrices;
pub mod pareto;
pub mod structure;
