//! The full identification pipeline, one stage feeding the next:
//!
//! term generation -> cluster removal -> ERR/AIC structure selection ->
//! matrix construction -> Pareto sweep -> correlation decision -> free-run
//! simulation and static validation.
//!
//! Keeping this in one place means the CLI and any embedding tool run exactly
//! the same workflow and only differ in presentation.

use nalgebra::DVector;

use crate::data::{DynamicDataset, StaticDataset};
use crate::domain::{Diagnostics, IdentConfig, SelectedModel, StaticModel};
use crate::error::AppError;
use crate::fit::decision::{Decision, correlation_decision_maker};
use crate::fit::matrices::{build_mapping, build_regressor_matrix, build_static_matrix};
use crate::fit::pareto::{ParetoSet, generate_pareto_set};
use crate::fit::structure::{StructureSelection, select_structure};
use crate::math::{correlation, residual_whiteness, rmse};
use crate::model::clusters::{ClusterSet, remove_clusters};
use crate::model::simulate::{build_static_model, evaluate_static_model, simulate_model};
use crate::model::terms::generate_candidate_terms;

/// Number of lags summarized by the residual-whiteness diagnostic.
const WHITENESS_LAGS: usize = 20;

/// All computed outputs of a single identification run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Candidate count after cluster removal.
    pub candidates: usize,
    pub selection: StructureSelection,
    pub pareto: ParetoSet,
    pub decision: Decision,
    pub selected: SelectedModel,
    pub static_model: StaticModel,
    /// Free-run simulation over the validation record.
    pub simulation: Vec<f64>,
    /// Static prediction at the measured static samples.
    pub static_prediction: Vec<f64>,
    pub diagnostics: Diagnostics,
}

fn check_record(name: &str, record: &DynamicDataset) -> Result<(), AppError> {
    if record.t.len() != record.u.len() || record.u.len() != record.y.len() {
        return Err(AppError::dimension_mismatch(format!(
            "{name} record has inconsistent lengths (t={}, u={}, y={}).",
            record.t.len(),
            record.u.len(),
            record.y.len()
        )));
    }
    Ok(())
}

/// Execute the full identification pipeline.
pub fn run_identification(
    config: &IdentConfig,
    ident: &DynamicDataset,
    valid: &DynamicDataset,
    statics: &StaticDataset,
) -> Result<RunOutput, AppError> {
    config.validate()?;
    check_record("Identification", ident)?;
    check_record("Validation", valid)?;
    if statics.u.len() != statics.y.len() {
        return Err(AppError::dimension_mismatch(format!(
            "Static record has inconsistent lengths (u={}, y={}).",
            statics.u.len(),
            statics.y.len()
        )));
    }

    // 1) Candidate terms, minus any clusters the caller ruled out.
    let mut candidates_model = generate_candidate_terms(config)?;
    for &key in &config.removed_clusters {
        candidates_model = remove_clusters(&candidates_model, key);
    }
    if candidates_model.is_empty() {
        return Err(AppError::empty_model(
            "Cluster removal emptied the candidate set.",
        ));
    }
    let candidates = candidates_model.len();

    // 2) Structure selection on identification data.
    let selection = select_structure(&candidates_model, &ident.u, &ident.y)?;
    let model = selection.model.clone();

    // 3) Bi-objective problem setup.
    let clusters = ClusterSet::from_model(&model);
    let p = build_regressor_matrix(&model, &ident.u, &ident.y)?;
    let e = build_static_matrix(&clusters, &statics.u, &statics.y)?;
    let a = build_mapping(&model, &clusters);
    let yi = DVector::from_column_slice(&ident.y[model.max_delay()..]);
    let ys = DVector::from_column_slice(&statics.y);

    // 4) Pareto sweep and decision on validation data.
    let pareto = generate_pareto_set(&p, &e, &a, &yi, &ys, config.weight_count)?;
    let decision = correlation_decision_maker(&model, &pareto, &valid.u, &valid.y)?;
    let winner = &pareto.points[decision.winner];

    let selected = SelectedModel {
        model: model.clone(),
        parameters: decision.parameters.iter().copied().collect(),
        winning_index: decision.winner,
        winning_lambda: winner.lambda,
        correlation: decision.correlation,
    };

    // 5) Validation artifacts and diagnostics.
    let simulation = simulate_model(&model, &decision.parameters, &valid.u, &valid.y)?;
    let static_model = build_static_model(&model, &decision.parameters);
    let static_prediction = evaluate_static_model(&static_model, &statics.u, &statics.y)?;

    let delay = model.max_delay();
    let residual: Vec<f64> = valid.y[delay..]
        .iter()
        .zip(simulation[delay..].iter())
        .map(|(m, s)| m - s)
        .collect();
    let diagnostics = Diagnostics {
        rmse: rmse(&simulation[delay..], &valid.y[delay..]),
        residual_whiteness: residual_whiteness(&residual, WHITENESS_LAGS),
        static_correlation: correlation(&static_prediction, &statics.y),
    };

    Ok(RunOutput {
        candidates,
        selection,
        pareto,
        decision,
        selected,
        static_model,
        simulation,
        static_prediction,
        diagnostics,
    })
}
