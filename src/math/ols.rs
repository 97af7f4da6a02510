//! Stabilized least squares solver.
//!
//! Every estimation step in this project reduces to a linear regression
//!
//! ```text
//! minimize ‖z - X·θ‖²
//! ```
//!
//! solved many times: once per prefix length during order selection and once
//! per weighting during the Pareto sweep.
//!
//! Implementation choices:
//! - SVD rather than normal equations. Polynomial regressor columns become
//!   nearly collinear as the nonlinearity degree grows, and the `λ=0` end of
//!   the bi-objective sweep is rank-deficient on purpose (fewer clusters than
//!   terms). The SVD min-norm solution stays well-behaved in both cases.
//! - Progressively looser singular-value tolerances before giving up.
//! - `try_svd` with an iteration cap so a pathological matrix reports failure
//!   to the caller instead of aborting the sweep.

use nalgebra::{DMatrix, DVector};

/// Iteration cap for the SVD decomposition.
const SVD_MAX_ITERS: usize = 250;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, z: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().try_svd(true, true, f64::EPSILON, SVD_MAX_ITERS)?;

    // Try progressively looser tolerances if the strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(theta) = svd.solve(z, tol) {
            if theta.iter().all(|v| v.is_finite()) {
                return Some(theta);
            }
        }
    }

    None
}

/// Residual sum of squares `‖z - X·θ‖²`.
pub fn residual_sum_of_squares(x: &DMatrix<f64>, z: &DVector<f64>, theta: &DVector<f64>) -> f64 {
    let r = z - x * theta;
    r.dot(&r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit z = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let z = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let theta = solve_least_squares(&x, &z).unwrap();
        assert!((theta[0] - 2.0).abs() < 1e-10);
        assert!((theta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_handles_rank_deficiency() {
        // Two identical columns: infinitely many solutions; the min-norm
        // solution must still reproduce the observations.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let z = DVector::from_row_slice(&[2.0, 4.0, 6.0]);

        let theta = solve_least_squares(&x, &z).unwrap();
        let rss = residual_sum_of_squares(&x, &z, &theta);
        assert!(rss < 1e-18, "rank-deficient fit should still interpolate, rss={rss}");
    }

    #[test]
    fn least_squares_rejects_non_finite_targets() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let z = DVector::from_row_slice(&[f64::NAN, 1.0]);
        assert!(solve_least_squares(&x, &z).is_none());
    }

    #[test]
    fn residual_sum_of_squares_matches_hand_value() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let z = DVector::from_row_slice(&[1.0, 1.0]);
        let theta = DVector::from_row_slice(&[1.0]);
        // residuals: [0, -1]
        assert!((residual_sum_of_squares(&x, &z, &theta) - 1.0).abs() < 1e-12);
    }
}
