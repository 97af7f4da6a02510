//! Free-run simulation and the reduced static model.
//!
//! Free-run means strictly open loop: after the initial condition window the
//! model feeds on its own predictions, never on measured output. A bad early
//! prediction therefore propagates, which is the point — this measures true
//! predictive quality rather than one-step-ahead fit. Divergence shows up as
//! non-finite values in the returned sequence and is scored (not hidden) by
//! the decision maker.

use nalgebra::DVector;

use crate::domain::{Model, StaticCoefficient, StaticModel};
use crate::error::AppError;
use crate::model::terms::eval_term;

/// Free-run simulation of `model` with parameters `theta` over input `u`.
///
/// `y_init` must supply at least the first `max_delay` measured outputs; they
/// seed the recursion and are copied into the returned sequence unchanged.
/// The result has the same length as `u`.
pub fn simulate_model(
    model: &Model,
    theta: &DVector<f64>,
    u: &[f64],
    y_init: &[f64],
) -> Result<Vec<f64>, AppError> {
    if model.is_empty() {
        return Err(AppError::empty_model("Cannot simulate a model with no terms."));
    }
    if theta.len() != model.len() {
        return Err(AppError::dimension_mismatch(format!(
            "Parameter vector has {} entries but the model has {} terms.",
            theta.len(),
            model.len()
        )));
    }
    let delay = model.max_delay();
    if y_init.len() < delay {
        return Err(AppError::dimension_mismatch(format!(
            "Initial condition needs {} samples, got {}.",
            delay,
            y_init.len()
        )));
    }
    if u.len() < delay {
        return Err(AppError::dimension_mismatch(format!(
            "Input sequence ({} samples) is shorter than the lag window ({}).",
            u.len(),
            delay
        )));
    }

    let mut y_hat = Vec::with_capacity(u.len());
    y_hat.extend_from_slice(&y_init[..delay]);

    for t in delay..u.len() {
        let mut acc = 0.0;
        for (i, term) in model.terms.iter().enumerate() {
            acc += theta[i] * eval_term(term, &y_hat, u, t);
        }
        y_hat.push(acc);
    }

    Ok(y_hat)
}

/// Render the model equation with its coefficients.
pub fn display_model(model: &Model, theta: &DVector<f64>) -> String {
    let mut out = String::from("y[k] =");
    for (i, term) in model.terms.iter().enumerate() {
        let c = theta[i];
        let sign = if c < 0.0 {
            " - "
        } else if i == 0 {
            " "
        } else {
            " + "
        };
        out.push_str(sign);
        let magnitude = c.abs();
        if term.is_constant() {
            out.push_str(&format!("{magnitude:.4}"));
        } else {
            out.push_str(&format!("{magnitude:.4}*{}", term.describe()));
        }
    }
    out
}

/// Aggregate per-term parameters down to one coefficient per cluster.
///
/// In steady state every member of a cluster `(p, m)` contributes
/// `θ_i · ȳ^p · ū^m`, so the cluster coefficient is simply the sum of its
/// members' parameters.
pub fn build_static_model(model: &Model, theta: &DVector<f64>) -> StaticModel {
    let clusters = crate::model::clusters::ClusterSet::from_model(model);
    let coefficients = clusters
        .keys()
        .map(|key| StaticCoefficient {
            cluster: key,
            value: clusters.member_indices(key).iter().map(|&i| theta[i]).sum(),
        })
        .collect();
    StaticModel { coefficients }
}

/// Evaluate the reduced static model against measured static samples.
///
/// Output-bearing clusters evaluate at the measured steady-state output
/// `y_s`, matching how the static matrix is built.
pub fn evaluate_static_model(
    static_model: &StaticModel,
    u: &[f64],
    y: &[f64],
) -> Result<Vec<f64>, AppError> {
    if u.len() != y.len() {
        return Err(AppError::dimension_mismatch(format!(
            "Static input/output lengths differ ({} vs {}).",
            u.len(),
            y.len()
        )));
    }

    let out = u
        .iter()
        .zip(y.iter())
        .map(|(&u_s, &y_s)| {
            static_model
                .coefficients
                .iter()
                .map(|c| {
                    c.value
                        * y_s.powi(c.cluster.output_factors as i32)
                        * u_s.powi(c.cluster.input_factors as i32)
                })
                .sum()
        })
        .collect();
    Ok(out)
}

/// Render the static equation, e.g. `y = 0.7500*u + 0.3333*u^2`.
pub fn display_static_model(static_model: &StaticModel) -> String {
    let mut out = String::from("y =");
    for (i, c) in static_model.coefficients.iter().enumerate() {
        let sign = if c.value < 0.0 {
            " - "
        } else if i == 0 {
            " "
        } else {
            " + "
        };
        out.push_str(sign);
        let magnitude = c.value.abs();
        let factor = c.cluster.describe();
        if factor == "1" {
            out.push_str(&format!("{magnitude:.4}"));
        } else {
            out.push_str(&format!("{magnitude:.4}*{factor}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClusterKey, Term};
    use crate::math::correlation;

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

    #[test]
    fn free_run_matches_hand_recursion() {
        let model = first_order_model();
        let theta = DVector::from_row_slice(&[0.5, 1.0]);
        let u = vec![1.0; 5];
        let y_hat = simulate_model(&model, &theta, &u, &[0.0]).unwrap();

        // y[t] = 0.5*y[t-1] + u[t-1] from y[0] = 0.
        assert_eq!(y_hat, vec![0.0, 1.0, 1.5, 1.75, 1.875]);
    }

    #[test]
    fn free_run_is_deterministic() {
        let model = first_order_model();
        let theta = DVector::from_row_slice(&[0.8, 0.4]);
        let u: Vec<f64> = (0..64).map(|i| ((i % 7) as f64) / 7.0).collect();

        let a = simulate_model(&model, &theta, &u, &[0.25]).unwrap();
        let b = simulate_model(&model, &theta, &u, &[0.25]).unwrap();
        assert_eq!(a, b, "identical inputs must reproduce bit-identical output");
    }

    #[test]
    fn free_run_validates_dimensions() {
        let model = first_order_model();
        let theta = DVector::from_row_slice(&[0.5]);
        assert!(simulate_model(&model, &theta, &[1.0; 4], &[0.0]).is_err());

        let theta = DVector::from_row_slice(&[0.5, 1.0]);
        assert!(simulate_model(&model, &theta, &[1.0; 4], &[]).is_err());
    }

    #[test]
    fn unstable_model_diverges_to_non_finite() {
        let model = Model {
            terms: vec![Term {
                y_exponents: vec![2],
                u_exponents: vec![0],
            }],
            output_lag: 1,
            input_lag: 0,
        };
        let theta = DVector::from_row_slice(&[10.0]);
        let y_hat = simulate_model(&model, &theta, &[0.0; 64], &[5.0]).unwrap();
        assert!(y_hat.iter().any(|v| !v.is_finite()));
    }

    #[test]
    fn static_model_aggregates_per_cluster() {
        let model = Model {
            terms: vec![
                Term {
                    y_exponents: vec![0, 0],
                    u_exponents: vec![1, 0],
                },
                Term {
                    y_exponents: vec![0, 0],
                    u_exponents: vec![0, 1],
                },
                Term {
                    y_exponents: vec![1, 0],
                    u_exponents: vec![0, 0],
                },
            ],
            output_lag: 2,
            input_lag: 2,
        };
        let theta = DVector::from_row_slice(&[0.3, 0.15, 0.4]);
        let static_model = build_static_model(&model, &theta);

        assert_eq!(static_model.coefficients.len(), 2);
        let input_cluster = static_model
            .coefficients
            .iter()
            .find(|c| c.cluster == ClusterKey::new(0, 1))
            .unwrap();
        assert!((input_cluster.value - 0.45).abs() < 1e-12);
    }

    #[test]
    fn linear_static_curve_is_recovered_exactly() {
        // y[k] = 0.5 + 0.5*y[k-1] + u[k-1] has static curve y = 1 + 2u.
        let model = Model {
            terms: vec![
                Term {
                    y_exponents: vec![0],
                    u_exponents: vec![0],
                },
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
        };
        let theta = DVector::from_row_slice(&[0.5, 0.5, 1.0]);
        let static_model = build_static_model(&model, &theta);

        let u: Vec<f64> = (0..20).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = u.iter().map(|v| 2.0 * v + 1.0).collect();
        let y_est = evaluate_static_model(&static_model, &u, &y).unwrap();

        for (est, truth) in y_est.iter().zip(y.iter()) {
            assert!((est - truth).abs() < 1e-12);
        }
        assert!(correlation(&y_est, &y) >= 0.99);
    }

    #[test]
    fn display_renders_signs_and_constants() {
        let model = Model {
            terms: vec![
                Term {
                    y_exponents: vec![0],
                    u_exponents: vec![0],
                },
                Term {
                    y_exponents: vec![1],
                    u_exponents: vec![0],
                },
            ],
            output_lag: 1,
            input_lag: 1,
        };
        let theta = DVector::from_row_slice(&[0.25, -0.5]);
        assert_eq!(display_model(&model, &theta), "y[k] = 0.2500 - 0.5000*y[k-1]");

        let static_model = build_static_model(&model, &theta);
        assert_eq!(display_static_model(&static_model), "y = 0.2500 - 0.5000*y");
    }
}
