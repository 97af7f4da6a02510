//! Pareto decision maker: minimal residual correlation on validation data.
//!
//! Every candidate parameter vector is judged by free-run simulation over the
//! validation records. The score is the absolute zero-lag normalized
//! correlation between the simulation residual and the measured output: a
//! biased estimate leaks output into its residual, so the candidate closest
//! to an uncorrelated (white) residual is the least biased one.
//!
//! A candidate whose simulation diverges gets an infinite score; it stays in
//! the audit table but can never win. Only an all-divergent set is fatal.

use nalgebra::DVector;

use crate::domain::Model;
use crate::error::AppError;
use crate::fit::pareto::ParetoSet;
use crate::math::{correlation, rmse};
use crate::model::simulate::simulate_model;

/// Per-candidate diagnostic pair, kept for reproducibility/audit.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub lambda: f64,
    /// Absolute residual/output correlation (infinite if the run diverged).
    pub correlation: f64,
    /// Free-run RMSE on validation data (infinite if the run diverged).
    pub rmse: f64,
}

/// Decision over the Pareto set.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Winning parameter vector.
    pub parameters: DVector<f64>,
    /// Winning candidate's correlation score.
    pub correlation: f64,
    /// Index of the winner within the Pareto set.
    pub winner: usize,
    /// Diagnostic pair for every candidate, in sweep order.
    pub scores: Vec<CandidateScore>,
}

/// Score every Pareto candidate on validation data and pick the one with
/// minimal absolute residual correlation.
pub fn correlation_decision_maker(
    model: &Model,
    pareto: &ParetoSet,
    uv: &[f64],
    yv: &[f64],
) -> Result<Decision, AppError> {
    if pareto.points.is_empty() {
        return Err(AppError::rank_deficient(
            "Pareto set is empty; nothing to decide on.",
        ));
    }
    if uv.len() != yv.len() {
        return Err(AppError::dimension_mismatch(format!(
            "Validation input/output lengths differ ({} vs {}).",
            uv.len(),
            yv.len()
        )));
    }
    let delay = model.max_delay();
    if yv.len() <= delay {
        return Err(AppError::dimension_mismatch(format!(
            "Validation length {} leaves no samples after the lag window ({}).",
            yv.len(),
            delay
        )));
    }

    let measured_tail = &yv[delay..];
    let mut scores = Vec::with_capacity(pareto.points.len());
    for point in &pareto.points {
        let y_hat = simulate_model(model, &point.theta, uv, yv)?;
        let simulated_tail = &y_hat[delay..];

        if simulated_tail.iter().any(|v| !v.is_finite()) {
            scores.push(CandidateScore {
                lambda: point.lambda,
                correlation: f64::INFINITY,
                rmse: f64::INFINITY,
            });
            continue;
        }

        let residual: Vec<f64> = measured_tail
            .iter()
            .zip(simulated_tail.iter())
            .map(|(m, s)| m - s)
            .collect();
        scores.push(CandidateScore {
            lambda: point.lambda,
            correlation: correlation(&residual, measured_tail).abs(),
            rmse: rmse(simulated_tail, measured_tail),
        });
    }

    let mut winner = 0;
    for (i, score) in scores.iter().enumerate() {
        if score.correlation < scores[winner].correlation {
            winner = i;
        }
    }
    if !scores[winner].correlation.is_finite() {
        return Err(AppError::rank_deficient(
            "Every Pareto candidate diverged in free-run simulation.",
        ));
    }

    Ok(Decision {
        parameters: pareto.points[winner].theta.clone(),
        correlation: scores[winner].correlation,
        winner,
        scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Term;
    use crate::fit::pareto::ParetoPoint;

    fn first_order_model() -> Model {
        Model {
            terms: vec![
                Term {
                    y_exponents: vec![1],
                    u_exponents: vec![0],
                },
                Term {
                    y_exponents: vec![0],
                    u_exponents: vec![1],
                },
            ],
            output_lag: 1,
            input_lag: 1,
        }
    }

    fn validation_data(len: usize) -> (Vec<f64>, Vec<f64>) {
        let u: Vec<f64> = (0..len).map(|i| ((i * 13 + 5) % 19) as f64 / 19.0 + 0.1).collect();
        let mut y = vec![0.2; len];
        for k in 1..len {
            y[k] = 0.5 * y[k - 1] + 0.8 * u[k - 1];
        }
        (u, y)
    }

    fn point(lambda: f64, theta: &[f64]) -> ParetoPoint {
        ParetoPoint {
            lambda,
            theta: DVector::from_row_slice(theta),
            dynamic_cost: 0.0,
            static_cost: 0.0,
        }
    }

    #[test]
    fn unbiased_candidate_wins() {
        let model = first_order_model();
        let (uv, yv) = validation_data(200);
        let pareto = ParetoSet {
            points: vec![point(0.0, &[0.40, 0.60]), point(1.0, &[0.5, 0.8])],
            skipped: Vec::new(),
        };

        let decision = correlation_decision_maker(&model, &pareto, &uv, &yv).unwrap();
        assert_eq!(decision.winner, 1);
        assert!(decision.correlation < 1e-6);
        assert_eq!(decision.scores.len(), 2);
        assert!(decision.scores[0].correlation > decision.scores[1].correlation);
    }

    #[test]
    fn divergent_candidate_is_penalized_not_fatal() {
        let model = first_order_model();
        let (uv, yv) = validation_data(200);
        let pareto = ParetoSet {
            points: vec![point(0.0, &[1.0e4, 1.0]), point(1.0, &[0.5, 0.8])],
            skipped: Vec::new(),
        };

        let decision = correlation_decision_maker(&model, &pareto, &uv, &yv).unwrap();
        assert_eq!(decision.winner, 1);
        assert!(decision.scores[0].correlation.is_infinite());
        assert!(decision.scores[0].rmse.is_infinite());
    }

    #[test]
    fn all_divergent_candidates_are_fatal() {
        let model = first_order_model();
        let (uv, yv) = validation_data(100);
        let pareto = ParetoSet {
            points: vec![point(0.0, &[1.0e4, 1.0]), point(1.0, &[2.0e4, 1.0])],
            skipped: Vec::new(),
        };

        let err = correlation_decision_maker(&model, &pareto, &uv, &yv).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::RankDeficient);
    }

    #[test]
    fn mismatched_validation_lengths_are_rejected() {
        let model = first_order_model();
        let pareto = ParetoSet {
            points: vec![point(1.0, &[0.5, 0.8])],
            skipped: Vec::new(),
        };
        let err = correlation_decision_maker(&model, &pareto, &[0.1; 10], &[0.1; 9]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DimensionMismatch);
    }
}
