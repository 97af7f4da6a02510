//! Synthetic process data generation.
//!
//! The demo pipeline identifies a known second-order polynomial process with
//! normalized (per-unit) signals:
//!
//! ```text
//! y[k] = 0.4·y[k-1] + 0.3·u[k-1] + 0.15·u[k-2] + 0.2·u[k-1]² + e[k]
//! ```
//!
//! driven by a piecewise-constant excitation input. The static curve of the
//! same process follows from its fixed point:
//! `ȳ = 0.4·ȳ + 0.45·ū + 0.2·ū²`, i.e. `ȳ = 0.75·ū + ū²/3`.
//!
//! Everything is seeded and deterministic so demo runs and tests reproduce
//! exactly. Loading recorded measurement files is a collaborator's job; this
//! module only stands in for it.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

/// Measured dynamic record: time base plus input/output sequences.
#[derive(Debug, Clone)]
pub struct DynamicDataset {
    pub t: Vec<f64>,
    pub u: Vec<f64>,
    pub y: Vec<f64>,
}

/// Measured static curve: steady-state input/output pairs.
#[derive(Debug, Clone)]
pub struct StaticDataset {
    pub u: Vec<f64>,
    pub y: Vec<f64>,
}

/// Knobs for the synthetic dataset.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub ident_len: usize,
    pub valid_len: usize,
    pub static_len: usize,
    /// Standard deviation of the additive equation noise.
    pub noise_std: f64,
    pub seed: u64,
    /// Samples each excitation level is held for.
    pub step_hold: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            ident_len: 600,
            valid_len: 400,
            static_len: 40,
            noise_std: 0.005,
            seed: 42,
            step_hold: 25,
        }
    }
}

/// True process coefficients (second order, degree 2).
const A_Y1: f64 = 0.4;
const B_U1: f64 = 0.3;
const B_U2: f64 = 0.15;
const B_U1_SQ: f64 = 0.2;

/// Lag window of the true process.
const PROCESS_DELAY: usize = 2;

fn process_step(y1: f64, u1: f64, u2: f64) -> f64 {
    A_Y1 * y1 + B_U1 * u1 + B_U2 * u2 + B_U1_SQ * u1 * u1
}

fn validate(config: &SampleConfig) -> Result<(), AppError> {
    if config.ident_len <= 4 * PROCESS_DELAY || config.valid_len <= 4 * PROCESS_DELAY {
        return Err(AppError::invalid_configuration(
            "Dynamic record lengths are too short to excite the process.",
        ));
    }
    if config.static_len < 2 {
        return Err(AppError::invalid_configuration(
            "Static curve needs at least 2 samples.",
        ));
    }
    if config.step_hold == 0 {
        return Err(AppError::invalid_configuration("Step hold must be >= 1."));
    }
    if !(config.noise_std.is_finite() && config.noise_std >= 0.0) {
        return Err(AppError::invalid_configuration("Invalid noise level."));
    }
    Ok(())
}

/// Generate the identification and validation records.
///
/// Both records come from the same seeded generator, so the pair is
/// reproducible as a whole and the two input realizations differ.
pub fn generate_dynamic_data(
    config: &SampleConfig,
) -> Result<(DynamicDataset, DynamicDataset), AppError> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise_std.max(f64::MIN_POSITIVE))
        .map_err(|e| AppError::invalid_configuration(format!("Noise distribution error: {e}")))?;

    let ident = simulate_record(&mut rng, &noise, config.ident_len, config.step_hold, config.noise_std);
    let valid = simulate_record(&mut rng, &noise, config.valid_len, config.step_hold, config.noise_std);
    Ok((ident, valid))
}

fn simulate_record(
    rng: &mut StdRng,
    noise: &Normal<f64>,
    len: usize,
    step_hold: usize,
    noise_std: f64,
) -> DynamicDataset {
    let mut u = Vec::with_capacity(len);
    let mut level = rng.gen_range(0.1..=1.0);
    for k in 0..len {
        if k % step_hold == 0 && k > 0 {
            level = rng.gen_range(0.1..=1.0);
        }
        u.push(level);
    }

    let mut y = vec![0.0; len];
    for k in PROCESS_DELAY..len {
        let e = if noise_std > 0.0 { noise.sample(rng) } else { 0.0 };
        y[k] = process_step(y[k - 1], u[k - 1], u[k - 2]) + e;
    }

    DynamicDataset {
        t: (0..len).map(|k| k as f64).collect(),
        u,
        y,
    }
}

/// Generate the measured static curve by settling the true process at each
/// input level.
pub fn generate_static_data(config: &SampleConfig) -> Result<StaticDataset, AppError> {
    validate(config)?;

    let n = config.static_len;
    let mut u = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let level = 0.1 + 0.9 * i as f64 / (n - 1) as f64;
        // The map is a contraction in y (slope 0.4), so the fixed point
        // settles long before the iteration cap.
        let mut steady = 0.0;
        for _ in 0..200 {
            steady = process_step(steady, level, level);
        }
        u.push(level);
        y.push(steady);
    }
    Ok(StaticDataset { u, y })
}
