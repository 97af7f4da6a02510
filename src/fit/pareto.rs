//! Bi-objective parameter estimation: the Pareto sweep.
//!
//! For a weighting `λ ∈ [0, 1]` the estimator solves
//!
//! ```text
//! minimize λ·‖yi − P·θ‖² + (1−λ)·‖y − E·A·θ‖²
//! ```
//!
//! by stacking `[√λ·P; √(1−λ)·E·A]` against `[√λ·yi; √(1−λ)·y]` and running
//! the stabilized least-squares solver, so `λ=0` and `λ=1` are the exact
//! single-objective limits. One candidate per weighting; each candidate is
//! reported with its two raw (unweighted) objective values.
//!
//! Weightings are independent, so the sweep evaluates them in parallel and
//! joins before returning. A weighting that cannot be solved is recorded in
//! `skipped` and the sweep continues; only an all-failed sweep is fatal.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::error::AppError;
use crate::math::{residual_sum_of_squares, solve_least_squares};

/// One candidate of the Pareto set.
#[derive(Debug, Clone)]
pub struct ParetoPoint {
    /// Weighting that produced this candidate.
    pub lambda: f64,
    /// Estimated parameter vector (one entry per model term).
    pub theta: DVector<f64>,
    /// Raw dynamic objective `‖yi − P·θ‖²`.
    pub dynamic_cost: f64,
    /// Raw static objective `‖y − E·A·θ‖²`.
    pub static_cost: f64,
}

/// Pareto-optimal candidate set, in weighting order.
#[derive(Debug, Clone)]
pub struct ParetoSet {
    pub points: Vec<ParetoPoint>,
    /// Weightings that could not be solved: (sweep index, reason).
    pub skipped: Vec<(usize, String)>,
}

/// Solve the weighted bi-objective problem for `weight_count` evenly spaced
/// weightings.
///
/// # Arguments
/// - `p`: dynamic regressor matrix (samples × terms)
/// - `e`: static cluster matrix (static samples × clusters)
/// - `a`: cluster mapping (clusters × terms)
/// - `yi`: dynamic target (post-lag identification output)
/// - `ys`: static target
pub fn generate_pareto_set(
    p: &DMatrix<f64>,
    e: &DMatrix<f64>,
    a: &DMatrix<f64>,
    yi: &DVector<f64>,
    ys: &DVector<f64>,
    weight_count: usize,
) -> Result<ParetoSet, AppError> {
    if weight_count < 2 {
        return Err(AppError::invalid_configuration(format!(
            "Weighting count must be >= 2 to cover both single-objective limits (got {weight_count})."
        )));
    }
    let lambdas: Vec<f64> = (0..weight_count)
        .map(|k| k as f64 / (weight_count - 1) as f64)
        .collect();
    generate_pareto_set_with_weights(p, e, a, yi, ys, &lambdas)
}

/// Same sweep with caller-supplied weighting values.
pub fn generate_pareto_set_with_weights(
    p: &DMatrix<f64>,
    e: &DMatrix<f64>,
    a: &DMatrix<f64>,
    yi: &DVector<f64>,
    ys: &DVector<f64>,
    lambdas: &[f64],
) -> Result<ParetoSet, AppError> {
    if lambdas.is_empty() {
        return Err(AppError::invalid_configuration(
            "Weighting list must not be empty.",
        ));
    }
    if lambdas.iter().any(|l| !l.is_finite() || *l < 0.0 || *l > 1.0) {
        return Err(AppError::invalid_configuration(
            "Weightings must all lie in [0, 1].",
        ));
    }
    if p.nrows() != yi.len() {
        return Err(AppError::dimension_mismatch(format!(
            "Regressor matrix has {} rows but the dynamic target has {}.",
            p.nrows(),
            yi.len()
        )));
    }
    if e.nrows() != ys.len() {
        return Err(AppError::dimension_mismatch(format!(
            "Static matrix has {} rows but the static target has {}.",
            e.nrows(),
            ys.len()
        )));
    }
    if a.nrows() != e.ncols() || a.ncols() != p.ncols() {
        return Err(AppError::dimension_mismatch(format!(
            "Mapping is {}x{} but clusters={} and terms={}.",
            a.nrows(),
            a.ncols(),
            e.ncols(),
            p.ncols()
        )));
    }

    let ea = e * a;

    // One independent solve per weighting; order-preserving parallel map.
    let results: Vec<Result<ParetoPoint, String>> = lambdas
        .par_iter()
        .map(|&lambda| solve_weighting(p, &ea, yi, ys, lambda))
        .collect();

    let mut points = Vec::with_capacity(lambdas.len());
    let mut skipped = Vec::new();
    for (idx, result) in results.into_iter().enumerate() {
        match result {
            Ok(point) => points.push(point),
            Err(reason) => skipped.push((idx, reason)),
        }
    }

    if points.is_empty() {
        return Err(AppError::rank_deficient(format!(
            "All {} weightings of the Pareto sweep failed to solve.",
            lambdas.len()
        )));
    }
    Ok(ParetoSet { points, skipped })
}

fn solve_weighting(
    p: &DMatrix<f64>,
    ea: &DMatrix<f64>,
    yi: &DVector<f64>,
    ys: &DVector<f64>,
    lambda: f64,
) -> Result<ParetoPoint, String> {
    let n = p.nrows();
    let s = ea.nrows();
    let terms = p.ncols();

    let w_dyn = lambda.sqrt();
    let w_static = (1.0 - lambda).sqrt();

    let mut x = DMatrix::zeros(n + s, terms);
    x.view_mut((0, 0), (n, terms)).copy_from(&(p * w_dyn));
    x.view_mut((n, 0), (s, terms)).copy_from(&(ea * w_static));

    let mut z = DVector::zeros(n + s);
    z.rows_mut(0, n).copy_from(&(yi * w_dyn));
    z.rows_mut(n, s).copy_from(&(ys * w_static));

    let theta = solve_least_squares(&x, &z)
        .ok_or_else(|| format!("Ill-conditioned system at lambda={lambda:.4}."))?;

    Ok(ParetoPoint {
        lambda,
        dynamic_cost: residual_sum_of_squares(p, yi, &theta),
        static_cost: residual_sum_of_squares(ea, ys, &theta),
        theta,
    })
}
