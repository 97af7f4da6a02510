//! Reporting utilities: formatted terminal output for an identification run.
//!
//! Formatting stays in one place so the estimation code remains clean and
//! the output is easy to change (or snapshot-test) later.

use crate::app::pipeline::RunOutput;
use crate::domain::IdentConfig;
use crate::model::simulate::{display_model, display_static_model};

/// Format the full run summary: configuration, structure selection, sweep,
/// decision, and diagnostics.
pub fn format_run_summary(config: &IdentConfig, output: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== narx - polynomial NARX identification ===\n");
    out.push_str(&format!(
        "Config: degree={} ly={} lu={} constant={} weightings={}\n",
        config.degree,
        config.output_lag,
        config.input_lag,
        config.include_constant,
        config.weight_count,
    ));
    if !config.removed_clusters.is_empty() {
        let removed: Vec<String> = config
            .removed_clusters
            .iter()
            .map(|k| k.describe())
            .collect();
        out.push_str(&format!("Removed clusters: {}\n", removed.join(", ")));
    }

    out.push_str(&format!(
        "\nStructure: {} candidates -> {} retained (AIC)\n",
        output.candidates, output.selection.retained
    ));
    for (i, term) in output.selected.model.terms.iter().enumerate() {
        out.push_str(&format!(
            "  {:<2} {:<22} kind={:<8} ERR={:.5}\n",
            i + 1,
            term.describe(),
            term.kind().display_name(),
            output.selection.err[i],
        ));
    }

    out.push_str(&format!(
        "\nPareto sweep: {} candidates",
        output.pareto.points.len()
    ));
    if output.pareto.skipped.is_empty() {
        out.push('\n');
    } else {
        out.push_str(&format!(" ({} weightings skipped)\n", output.pareto.skipped.len()));
        for (idx, reason) in &output.pareto.skipped {
            out.push_str(&format!("  (skipped #{idx}) {reason}\n"));
        }
    }
    out.push_str(&format!(
        "Decision: weighting #{} (lambda={:.4}), |residual correlation|={:.4}\n",
        output.selected.winning_index, output.selected.winning_lambda, output.selected.correlation,
    ));

    let theta = nalgebra::DVector::from_column_slice(&output.selected.parameters);
    out.push_str("\nSelected model:\n");
    out.push_str(&format!("  {}\n", display_model(&output.selected.model, &theta)));
    out.push_str("Static model:\n");
    out.push_str(&format!("  {}\n", display_static_model(&output.static_model)));

    out.push_str("\nValidation diagnostics:\n");
    out.push_str(&format!("- free-run RMSE          : {:.4}\n", output.diagnostics.rmse));
    out.push_str(&format!(
        "- residual whiteness     : {:.4}\n",
        output.diagnostics.residual_whiteness
    ));
    out.push_str(&format!(
        "- static correlation     : {:.4}\n",
        output.diagnostics.static_correlation
    ));

    out
}

/// Format the candidate term table for a configuration (the `terms` command).
pub fn format_term_table(model: &crate::domain::Model) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} candidate terms:\n", model.len()));
    out.push_str("idx  term                    degree  kind      cluster\n");
    for (i, term) in model.terms.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<23} {:<7} {:<9} {}\n",
            i + 1,
            term.describe(),
            term.degree(),
            term.kind().display_name(),
            term.cluster_key().describe(),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleConfig, generate_dynamic_data, generate_static_data};
    use crate::model::terms::generate_candidate_terms;

    #[test]
    fn run_summary_mentions_the_key_sections() {
        let sample = SampleConfig::default();
        let (ident, valid) = generate_dynamic_data(&sample).unwrap();
        let statics = generate_static_data(&sample).unwrap();
        let config = IdentConfig::default();
        let output = crate::app::pipeline::run_identification(&config, &ident, &valid, &statics).unwrap();

        let summary = format_run_summary(&config, &output);
        assert!(summary.contains("Structure:"));
        assert!(summary.contains("Pareto sweep:"));
        assert!(summary.contains("y[k] ="));
        assert!(summary.contains("free-run RMSE"));
    }

    #[test]
    fn term_table_lists_every_candidate() {
        let model = generate_candidate_terms(&IdentConfig::default()).unwrap();
        let table = format_term_table(&model);
        assert!(table.contains("15 candidate terms"));
        assert!(table.contains("u[k-2]"));
    }
}
