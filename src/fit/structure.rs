//! Structure selection: ERR ranking followed by Akaike order selection.
//!
//! Step 1 ranks the candidate terms by Error Reduction Ratio: candidates are
//! orthogonalized incrementally (classical Gram–Schmidt) against the terms
//! already picked, and at each round the term whose orthogonalized regressor
//! explains the largest fraction of the remaining output variance wins. Ties
//! break by generation order, so the ranking is stable and deterministic.
//!
//! Step 2 walks every prefix of the ranked list, fits it by least squares,
//! and scores it with `AIC(k) = N·ln(SSE/N) + 2k`. The retained model is the
//! prefix minimizing the criterion. A prefix whose fit cannot be solved gets
//! an infinite criterion value instead of aborting the run.

use nalgebra::DVector;

use crate::domain::Model;
use crate::error::AppError;
use crate::fit::matrices::build_regressor_matrix;
use crate::math::{residual_sum_of_squares, solve_least_squares};

/// Relative threshold below which an orthogonalized regressor counts as
/// linearly dependent on the already-selected terms.
const DEGENERATE_RATIO: f64 = 1e-12;

/// Floor for the per-sample SSE inside the log, mirroring the usual guard
/// against `ln(0)` on noise-free data.
const SSE_FLOOR: f64 = 1e-12;

/// Outcome of structure selection.
#[derive(Debug, Clone)]
pub struct StructureSelection {
    /// ERR-ordered model truncated to the AIC-optimal prefix.
    pub model: Model,
    /// ERR value per ranked candidate (full candidate list; the first
    /// `retained` entries align with `model`).
    pub err: Vec<f64>,
    /// Criterion value per prefix length `1..=candidates`.
    pub aic: Vec<f64>,
    /// Number of retained terms.
    pub retained: usize,
}

/// Rank candidate terms by Error Reduction Ratio against identification data.
///
/// Returns the reordered model and the ERR value of each term in ranked
/// order. Terms whose orthogonalized regressor is numerically degenerate get
/// ERR 0 and sink to the end in generation order.
pub fn sort_by_err(model: &Model, u: &[f64], y: &[f64]) -> Result<(Model, Vec<f64>), AppError> {
    let p = build_regressor_matrix(model, u, y)?;
    let delay = model.max_delay();
    let target = DVector::from_column_slice(&y[delay..]);

    let sigma = target.dot(&target);
    if sigma <= 1e-300 || !sigma.is_finite() {
        return Err(AppError::rank_deficient(
            "Output sequence has no energy; ERR ranking is undefined.",
        ));
    }

    let n_terms = p.ncols();
    let mut columns: Vec<DVector<f64>> = (0..n_terms).map(|c| p.column(c).into_owned()).collect();
    let initial_norm: Vec<f64> = columns.iter().map(|q| q.dot(q)).collect();

    let mut remaining: Vec<usize> = (0..n_terms).collect();
    let mut order = Vec::with_capacity(n_terms);
    let mut err_by_rank = Vec::with_capacity(n_terms);

    loop {
        let mut best: Option<(usize, f64)> = None;
        for (pos, &idx) in remaining.iter().enumerate() {
            let q = &columns[idx];
            let qq = q.dot(q);
            if qq <= DEGENERATE_RATIO * initial_norm[idx].max(1e-300) {
                continue;
            }
            let qt = q.dot(&target);
            let err = (qt * qt) / (qq * sigma);
            if !err.is_finite() {
                continue;
            }
            // Strict comparison keeps the earliest (generation-order) term on ties.
            if best.map_or(true, |(_, e)| err > e) {
                best = Some((pos, err));
            }
        }

        let Some((pos, err)) = best else {
            break;
        };
        let idx = remaining.remove(pos);
        order.push(idx);
        err_by_rank.push(err);

        let w = columns[idx].clone();
        let ww = w.dot(&w);
        for &j in &remaining {
            let proj = columns[j].dot(&w) / ww;
            columns[j] -= &w * proj;
        }
    }

    // Degenerate leftovers: no explanatory power beyond the selected terms.
    for idx in remaining {
        order.push(idx);
        err_by_rank.push(0.0);
    }

    let ranked = Model {
        terms: order.iter().map(|&i| model.terms[i].clone()).collect(),
        output_lag: model.output_lag,
        input_lag: model.input_lag,
    };
    Ok((ranked, err_by_rank))
}

/// Akaike criterion over every prefix of the (ERR-ordered) candidate list.
///
/// Returns the criterion value per prefix length and the minimizing length.
pub fn akaike_information_criterion(
    model: &Model,
    u: &[f64],
    y: &[f64],
) -> Result<(Vec<f64>, usize), AppError> {
    let p = build_regressor_matrix(model, u, y)?;
    let delay = model.max_delay();
    let target = DVector::from_column_slice(&y[delay..]);
    let n = target.len() as f64;

    let mut criteria = Vec::with_capacity(p.ncols());
    for k in 1..=p.ncols() {
        let prefix = p.columns(0, k).into_owned();
        let value = match solve_least_squares(&prefix, &target) {
            Some(theta) => {
                let sse_per = (residual_sum_of_squares(&prefix, &target, &theta) / n).max(SSE_FLOOR);
                n * sse_per.ln() + 2.0 * k as f64
            }
            // Degenerate prefix: penalized, never fatal.
            None => f64::INFINITY,
        };
        criteria.push(value);
    }

    let mut best = 0;
    for (i, &value) in criteria.iter().enumerate() {
        if value < criteria[best] {
            best = i;
        }
    }
    Ok((criteria, best + 1))
}

/// Full structure selection: ERR ranking, criterion sweep, truncation.
pub fn select_structure(model: &Model, u: &[f64], y: &[f64]) -> Result<StructureSelection, AppError> {
    if model.is_empty() {
        return Err(AppError::empty_model(
            "Candidate set is empty; nothing to select a structure from.",
        ));
    }

    let (ranked, err) = sort_by_err(model, u, y)?;
    let (aic, retained) = akaike_information_criterion(&ranked, u, y)?;
    let truncated = ranked.truncated(retained);
    if truncated.is_empty() {
        return Err(AppError::empty_model("Structure selection retained zero terms."));
    }

    Ok(StructureSelection {
        model: truncated,
        err,
        aic,
        retained,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IdentConfig;
    use crate::model::terms::generate_candidate_terms;

    /// Deterministic varied input in (0, 1).
    fn test_input(len: usize) -> Vec<f64> {
        (0..len).map(|i| ((i * 37 + 11) % 23) as f64 / 23.0 + 0.05).collect()
    }

    /// y[k] = 0.5 y[k-1] + 0.8 u[k-1], noise-free.
    fn first_order_data(len: usize) -> (Vec<f64>, Vec<f64>) {
        let u = test_input(len);
        let mut y = vec![0.3; len];
        for k in 1..len {
            y[k] = 0.5 * y[k - 1] + 0.8 * u[k - 1];
        }
        (u, y)
    }

    fn candidates() -> Model {
        let config = IdentConfig {
            degree: 2,
            output_lag: 1,
            input_lag: 1,
            include_constant: true,
            ..IdentConfig::default()
        };
        generate_candidate_terms(&config).unwrap()
    }

    #[test]
    fn err_values_are_non_increasing_along_the_ranking() {
        let (u, y) = first_order_data(300);
        let (_, err) = sort_by_err(&candidates(), &u, &y).unwrap();

        for pair in err.windows(2) {
            assert!(
                pair[0] >= pair[1] - 1e-9,
                "ERR must not increase along the ranking: {err:?}"
            );
        }
        // The dominant fraction of output variance is explained up front.
        assert!(err[0] > 0.5);
    }

    #[test]
    fn ranking_keeps_all_terms_and_is_stable() {
        let (u, y) = first_order_data(200);
        let model = candidates();
        let (ranked_a, err_a) = sort_by_err(&model, &u, &y).unwrap();
        let (ranked_b, err_b) = sort_by_err(&model, &u, &y).unwrap();

        assert_eq!(ranked_a.len(), model.len());
        assert_eq!(err_a.len(), model.len());
        assert_eq!(ranked_a, ranked_b);
        assert_eq!(err_a, err_b);
    }

    #[test]
    fn akaike_retains_the_true_terms_on_clean_data() {
        let (u, y) = first_order_data(400);
        let selection = select_structure(&candidates(), &u, &y).unwrap();

        // The generating terms must both survive.
        let described: Vec<String> = selection.model.terms.iter().map(|t| t.describe()).collect();
        assert!(described.contains(&"y[k-1]".to_string()), "{described:?}");
        assert!(described.contains(&"u[k-1]".to_string()), "{described:?}");
        // And the model stays small on noise-free first-order data.
        assert!(selection.retained <= 3, "retained {}", selection.retained);
    }

    #[test]
    fn collinear_candidates_do_not_crash_the_criterion() {
        // Constant input makes u[k-1] collinear with the constant term; every
        // prefix criterion must still be computable.
        let len = 120;
        let u = vec![0.7; len];
        let mut y = vec![0.1; len];
        for k in 1..len {
            y[k] = 0.5 * y[k - 1] + 0.8 * u[k - 1];
        }

        let (criteria, retained) = {
            let (ranked, _) = sort_by_err(&candidates(), &u, &y).unwrap();
            akaike_information_criterion(&ranked, &u, &y).unwrap()
        };
        assert_eq!(criteria.len(), candidates().len());
        assert!(retained >= 1);
        assert!(criteria[retained - 1].is_finite());
    }

    #[test]
    fn zero_output_is_rejected() {
        let u = test_input(50);
        let y = vec![0.0; 50];
        let err = sort_by_err(&candidates(), &u, &y).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::RankDeficient);
    }

    #[test]
    fn empty_candidate_set_is_fatal() {
        let model = Model {
            terms: Vec::new(),
            output_lag: 1,
            input_lag: 1,
        };
        let (u, y) = first_order_data(50);
        let err = select_structure(&model, &u, &y).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::EmptyModel);
    }
}
