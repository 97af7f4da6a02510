//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - generates the synthetic process data
//! - runs the identification pipeline
//! - prints the report

use clap::Parser;

use crate::cli::{Cli, Command, FitArgs, TermsArgs};
use crate::data::{SampleConfig, generate_dynamic_data, generate_static_data};
use crate::domain::IdentConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `narx` binary.
pub fn run() -> Result<(), AppError> {
    // `narx` and `narx -d 3` should behave like `narx fit ...`, so rewrite the
    // argv list before clap sees it.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Terms(args) => handle_terms(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = ident_config_from_args(&args);
    let sample = sample_config_from_args(&args);

    let (ident, valid) = generate_dynamic_data(&sample)?;
    let statics = generate_static_data(&sample)?;
    let output = pipeline::run_identification(&config, &ident, &valid, &statics)?;

    println!("{}", crate::report::format_run_summary(&config, &output));
    Ok(())
}

fn handle_terms(args: TermsArgs) -> Result<(), AppError> {
    let config = IdentConfig {
        degree: args.degree,
        output_lag: args.ylag,
        input_lag: args.ulag,
        include_constant: !args.no_constant,
        ..IdentConfig::default()
    };
    let model = crate::model::terms::generate_candidate_terms(&config)?;
    println!("{}", crate::report::format_term_table(&model));
    Ok(())
}

pub fn ident_config_from_args(args: &FitArgs) -> IdentConfig {
    IdentConfig {
        degree: args.degree,
        output_lag: args.ylag,
        input_lag: args.ulag,
        include_constant: !args.no_constant,
        weight_count: args.weights,
        removed_clusters: args.remove.clone(),
    }
}

fn sample_config_from_args(args: &FitArgs) -> SampleConfig {
    SampleConfig {
        ident_len: args.samples,
        valid_len: (args.samples * 2 / 3).max(40),
        noise_std: args.noise,
        seed: args.seed,
        ..SampleConfig::default()
    }
}

/// Rewrite argv so `narx` defaults to `narx fit`.
///
/// Rules:
/// - `narx`                    -> `narx fit`
/// - `narx -d 3 ...`           -> `narx fit -d 3 ...`
/// - `narx --help/--version`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "terms");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    argv
}
