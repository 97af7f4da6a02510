//! Regression matrix construction.
//!
//! Three matrices connect the model structure to the data:
//!
//! - the dynamic regressor matrix `P` (rows = time samples after the lag
//!   window, columns = terms in model order)
//! - the static matrix `E` (rows = static samples, columns = clusters)
//! - the mapping `A` (clusters × terms, 0/1) that reduces per-term parameters
//!   to per-cluster static contributions, so `E·A·θ` is the static prediction
//!
//! Column order invariants: `P` follows model term order exactly; `E` and the
//! rows of `A` follow the deterministic cluster-key order.

use nalgebra::DMatrix;

use crate::domain::Model;
use crate::error::AppError;
use crate::model::clusters::ClusterSet;
use crate::model::terms::eval_term;

/// Build the dynamic regressor matrix from identification data.
///
/// One row per time index `t` in `max(ly,lu)..len`, one column per term.
pub fn build_regressor_matrix(
    model: &Model,
    u: &[f64],
    y: &[f64],
) -> Result<DMatrix<f64>, AppError> {
    if model.is_empty() {
        return Err(AppError::empty_model(
            "Cannot build a regressor matrix for a model with no terms.",
        ));
    }
    if u.len() != y.len() {
        return Err(AppError::dimension_mismatch(format!(
            "Input/output lengths differ ({} vs {}).",
            u.len(),
            y.len()
        )));
    }
    let delay = model.max_delay();
    if y.len() <= delay {
        return Err(AppError::dimension_mismatch(format!(
            "Sequence length {} leaves no samples after the lag window ({}).",
            y.len(),
            delay
        )));
    }

    let rows = y.len() - delay;
    Ok(DMatrix::from_fn(rows, model.len(), |r, c| {
        eval_term(&model.terms[c], y, u, delay + r)
    }))
}

/// Build the static matrix from the measured static curve.
///
/// Columns are aggregated per cluster: the entry for static sample `s` and
/// cluster `(p, m)` is `y_s^p · u_s^m`.
pub fn build_static_matrix(
    clusters: &ClusterSet,
    u: &[f64],
    y: &[f64],
) -> Result<DMatrix<f64>, AppError> {
    if clusters.is_empty() {
        return Err(AppError::empty_model(
            "Cannot build a static matrix without clusters.",
        ));
    }
    if u.len() != y.len() {
        return Err(AppError::dimension_mismatch(format!(
            "Static input/output lengths differ ({} vs {}).",
            u.len(),
            y.len()
        )));
    }
    if u.is_empty() {
        return Err(AppError::dimension_mismatch(
            "Static dataset is empty.",
        ));
    }

    let keys: Vec<_> = clusters.keys().collect();
    Ok(DMatrix::from_fn(u.len(), keys.len(), |s, c| {
        let key = keys[c];
        y[s].powi(key.output_factors as i32) * u[s].powi(key.input_factors as i32)
    }))
}

/// Build the linear map from per-term parameters to per-cluster static
/// contributions (clusters × terms, entries 0 or 1).
pub fn build_mapping(model: &Model, clusters: &ClusterSet) -> DMatrix<f64> {
    let keys: Vec<_> = clusters.keys().collect();
    let mut a = DMatrix::zeros(keys.len(), model.len());
    for (row, key) in keys.iter().enumerate() {
        for &term_idx in clusters.member_indices(*key) {
            a[(row, term_idx)] = 1.0;
        }
    }
    a
}
