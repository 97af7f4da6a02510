//! Scalar diagnostics: RMSE, Pearson correlation, and normalized
//! autocorrelation for residual-whiteness reporting.
//!
//! These are consumed in two places: the decision maker scores every Pareto
//! candidate with the residual/output correlation, and the report module
//! prints RMSE and whiteness figures for the selected model.

/// Root mean square error between two equally long sequences.
pub fn rmse(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    if a.is_empty() {
        return 0.0;
    }
    let sse: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    (sse / a.len() as f64).sqrt()
}

/// Pearson correlation coefficient in `[-1, 1]`.
///
/// Degenerate inputs (constant sequence, non-finite moments) yield `0.0` so a
/// perfectly flat residual counts as uncorrelated rather than poisoning the
/// decision criterion with NaN.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len();
    if n < 2 {
        return 0.0;
    }

    let n_f = n as f64;
    let mean_a = a.iter().sum::<f64>() / n_f;
    let mean_b = b.iter().sum::<f64>() / n_f;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom <= 1e-300 || !denom.is_finite() || !cov.is_finite() {
        return 0.0;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

/// Normalized autocorrelation function of `x` for lags `0..=max_lag`.
///
/// Values are normalized by the lag-0 autocovariance, so `r[0] = 1` and every
/// entry lies in `[-1, 1]`. `max_lag` is clamped to `len - 1`.
pub fn autocorrelation_function(x: &[f64], max_lag: usize) -> Vec<f64> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }
    let max_lag = max_lag.min(n - 1);

    let mean = x.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = x.iter().map(|v| v - mean).collect();
    let c0: f64 = centered.iter().map(|v| v * v).sum();

    let mut out = Vec::with_capacity(max_lag + 1);
    if c0 <= 1e-300 || !c0.is_finite() {
        // Constant sequence: define the whole function as zero past lag 0.
        out.push(if c0.is_finite() { 1.0 } else { 0.0 });
        out.resize(max_lag + 1, 0.0);
        return out;
    }

    for lag in 0..=max_lag {
        let mut c = 0.0;
        for t in lag..n {
            c += centered[t] * centered[t - lag];
        }
        out.push((c / c0).clamp(-1.0, 1.0));
    }
    out
}

/// Scalar whiteness summary: mean autocorrelation over the nonzero lags.
///
/// Near zero for a white residual sequence.
pub fn residual_whiteness(x: &[f64], max_lag: usize) -> f64 {
    let acf = autocorrelation_function(x, max_lag);
    if acf.len() <= 1 {
        return 0.0;
    }
    acf[1..].iter().sum::<f64>() / (acf.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rmse_of_identical_sequences_is_zero() {
        let a = [1.0, 2.0, 3.0];
        assert_eq!(rmse(&a, &a), 0.0);
    }

    #[test]
    fn rmse_matches_hand_value() {
        let a = [1.0, 2.0];
        let b = [1.0, 4.0];
        // errors: [0, 2] -> sqrt(4/2)
        assert!((rmse(&a, &b) - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn correlation_of_linear_relation_is_one() {
        let a: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let b: Vec<f64> = a.iter().map(|v| 3.0 * v - 7.0).collect();
        assert!((correlation(&a, &b) - 1.0).abs() < 1e-12);

        let neg: Vec<f64> = a.iter().map(|v| -v).collect();
        assert!((correlation(&a, &neg) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_of_constant_sequence_is_zero() {
        let a = [1.0; 10];
        let b: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert_eq!(correlation(&a, &b), 0.0);
    }

    #[test]
    fn autocorrelation_starts_at_one() {
        let x: Vec<f64> = (0..32).map(|i| ((i * 7919) % 13) as f64).collect();
        let acf = autocorrelation_function(&x, 5);
        assert_eq!(acf.len(), 6);
        assert!((acf[0] - 1.0).abs() < 1e-12);
        for r in &acf {
            assert!(*r >= -1.0 && *r <= 1.0);
        }
    }

    #[test]
    fn alternating_sequence_has_negative_lag_one() {
        let x: Vec<f64> = (0..64).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let acf = autocorrelation_function(&x, 1);
        assert!(acf[1] < -0.9);
    }
}
