//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during estimation
//! - exported by reporting/plotting collaborators
//! - reloaded later for comparisons between runs
//!
//! Everything here is structural: produced once, read-only afterwards. The
//! numeric work (term evaluation, matrices, solves) lives in `model` and `fit`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Structural cluster of a polynomial term: how many lagged-output and
/// lagged-input factors it multiplies together (exponent sums).
///
/// Terms sharing a key contribute to the same power of `(ȳ, ū)` in steady
/// state, which is why the static objective is expressed per cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterKey {
    pub output_factors: u32,
    pub input_factors: u32,
}

impl ClusterKey {
    pub fn new(output_factors: u32, input_factors: u32) -> Self {
        Self {
            output_factors,
            input_factors,
        }
    }

    /// Steady-state factor this cluster multiplies, e.g. `y^2`, `y*u`, or `1`.
    pub fn describe(&self) -> String {
        fn power(base: &str, exp: u32) -> Option<String> {
            match exp {
                0 => None,
                1 => Some(base.to_string()),
                _ => Some(format!("{base}^{exp}")),
            }
        }

        let parts: Vec<String> = [
            power("y", self.output_factors),
            power("u", self.input_factors),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            "1".to_string()
        } else {
            parts.join("*")
        }
    }
}

/// Structural role of a term within the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermKind {
    Constant,
    OutputOnly,
    InputOnly,
    Mixed,
}

impl TermKind {
    pub fn display_name(self) -> &'static str {
        match self {
            TermKind::Constant => "constant",
            TermKind::OutputOnly => "output",
            TermKind::InputOnly => "input",
            TermKind::Mixed => "mixed",
        }
    }
}

/// A monomial in lagged output/input samples.
///
/// `y_exponents[j]` is the exponent of `y[k-(j+1)]`, `u_exponents[j]` the
/// exponent of `u[k-(j+1)]`. Two terms are the same regressor exactly when
/// both exponent vectors are equal; lag identity matters, so permuting
/// exponents across lags produces a distinct term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub y_exponents: Vec<u8>,
    pub u_exponents: Vec<u8>,
}

impl Term {
    pub fn constant(output_lag: usize, input_lag: usize) -> Self {
        Self {
            y_exponents: vec![0; output_lag],
            u_exponents: vec![0; input_lag],
        }
    }

    /// Total degree (sum of all exponents).
    pub fn degree(&self) -> u32 {
        let y: u32 = self.y_exponents.iter().map(|&e| u32::from(e)).sum();
        let u: u32 = self.u_exponents.iter().map(|&e| u32::from(e)).sum();
        y + u
    }

    pub fn cluster_key(&self) -> ClusterKey {
        ClusterKey::new(
            self.y_exponents.iter().map(|&e| u32::from(e)).sum(),
            self.u_exponents.iter().map(|&e| u32::from(e)).sum(),
        )
    }

    pub fn kind(&self) -> TermKind {
        let key = self.cluster_key();
        match (key.output_factors, key.input_factors) {
            (0, 0) => TermKind::Constant,
            (_, 0) => TermKind::OutputOnly,
            (0, _) => TermKind::InputOnly,
            _ => TermKind::Mixed,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.kind() == TermKind::Constant
    }

    /// Human-readable rendering, e.g. `y[k-1]^2*u[k-2]` (`1` for the constant).
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        for (j, &e) in self.y_exponents.iter().enumerate() {
            match e {
                0 => {}
                1 => parts.push(format!("y[k-{}]", j + 1)),
                _ => parts.push(format!("y[k-{}]^{e}", j + 1)),
            }
        }
        for (j, &e) in self.u_exponents.iter().enumerate() {
            match e {
                0 => {}
                1 => parts.push(format!("u[k-{}]", j + 1)),
                _ => parts.push(format!("u[k-{}]^{e}", j + 1)),
            }
        }
        if parts.is_empty() {
            "1".to_string()
        } else {
            parts.join("*")
        }
    }
}

/// An ordered set of retained terms plus the lag window they were generated for.
///
/// Term order is significant: every derived matrix keeps its columns in this
/// exact order, and parameter vectors index into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub terms: Vec<Term>,
    pub output_lag: usize,
    pub input_lag: usize,
}

impl Model {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of initial samples that cannot be predicted (regression starts here).
    pub fn max_delay(&self) -> usize {
        self.output_lag.max(self.input_lag)
    }

    /// First `n` terms, keeping the lag window.
    pub fn truncated(&self, n: usize) -> Model {
        Model {
            terms: self.terms.iter().take(n).cloned().collect(),
            output_lag: self.output_lag,
            input_lag: self.input_lag,
        }
    }
}

/// Pipeline configuration: candidate generation, structure selection, and the
/// bi-objective sweep.
///
/// Weighting count and cluster removals are dataset tuning, not algorithmic
/// constants, so they live here rather than in the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentConfig {
    /// Maximum total degree of candidate terms. Must be >= 1.
    pub degree: u32,
    /// Maximum output lag `ly`.
    pub output_lag: usize,
    /// Maximum input lag `lu`.
    pub input_lag: usize,
    /// Whether to include a constant (degree-0) candidate term.
    pub include_constant: bool,
    /// Number of evenly spaced weightings in the Pareto sweep. Must be >= 2.
    pub weight_count: usize,
    /// Clusters removed from the candidate set before structure selection.
    pub removed_clusters: Vec<ClusterKey>,
}

impl Default for IdentConfig {
    fn default() -> Self {
        Self {
            degree: 2,
            output_lag: 2,
            input_lag: 2,
            include_constant: true,
            weight_count: 100,
            removed_clusters: Vec::new(),
        }
    }
}

impl IdentConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.degree < 1 {
            return Err(AppError::invalid_configuration(format!(
                "Nonlinearity degree must be >= 1 (got {}).",
                self.degree
            )));
        }
        if self.output_lag == 0 && self.input_lag == 0 && !self.include_constant {
            return Err(AppError::invalid_configuration(
                "Both lags are 0 and the constant term is disabled: no candidate terms exist.",
            ));
        }
        if self.weight_count < 2 {
            return Err(AppError::invalid_configuration(format!(
                "Weighting count must be >= 2 to cover both single-objective limits (got {}).",
                self.weight_count
            )));
        }
        Ok(())
    }
}

/// Final immutable result of a run: the retained structure, the winning
/// parameter vector, and which weighting produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedModel {
    pub model: Model,
    pub parameters: Vec<f64>,
    /// Index of the winning weighting within the sweep.
    pub winning_index: usize,
    /// Weighting `λ` of the winning candidate.
    pub winning_lambda: f64,
    /// Absolute residual/output correlation of the winner on validation data.
    pub correlation: f64,
}

/// Reduced static model: one aggregated coefficient per cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticModel {
    pub coefficients: Vec<StaticCoefficient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticCoefficient {
    pub cluster: ClusterKey,
    pub value: f64,
}

/// Scalar diagnostics reported for the selected model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    /// RMSE of the free-run simulation against measured validation output.
    pub rmse: f64,
    /// Whiteness summary of the validation residual (mean nonzero-lag autocorrelation).
    pub residual_whiteness: f64,
    /// Correlation between the static prediction and the measured static curve.
    pub static_correlation: f64,
}
