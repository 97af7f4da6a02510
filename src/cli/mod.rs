//! Command-line parsing for the NARX identification tool.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the estimation/math code.

use clap::{Parser, Subcommand};

use crate::domain::ClusterKey;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "narx",
    version,
    about = "Polynomial NARX identification with bi-objective (dynamic/static) estimation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Identify a model on the bundled synthetic process and print the report.
    Fit(FitArgs),
    /// Print the candidate term table for a configuration.
    Terms(TermsArgs),
}

/// Options for the identification run.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Nonlinearity degree of the candidate terms.
    #[arg(short = 'd', long, default_value_t = 2)]
    pub degree: u32,

    /// Maximum output lag `ly`.
    #[arg(long, default_value_t = 2)]
    pub ylag: usize,

    /// Maximum input lag `lu`.
    #[arg(long, default_value_t = 2)]
    pub ulag: usize,

    /// Disable the constant candidate term.
    #[arg(long)]
    pub no_constant: bool,

    /// Number of evenly spaced weightings in the Pareto sweep.
    #[arg(short = 'w', long, default_value_t = 100)]
    pub weights: usize,

    /// Remove a term cluster before structure selection, as "p,m"
    /// (output-factor and input-factor counts). Repeatable.
    #[arg(long, value_parser = parse_cluster_key)]
    pub remove: Vec<ClusterKey>,

    /// Random seed for the synthetic dataset.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Identification record length.
    #[arg(short = 'n', long, default_value_t = 600)]
    pub samples: usize,

    /// Equation noise standard deviation for the synthetic process.
    #[arg(long, default_value_t = 0.005)]
    pub noise: f64,
}

/// Options for the candidate term table.
#[derive(Debug, Parser, Clone)]
pub struct TermsArgs {
    /// Nonlinearity degree of the candidate terms.
    #[arg(short = 'd', long, default_value_t = 2)]
    pub degree: u32,

    /// Maximum output lag `ly`.
    #[arg(long, default_value_t = 2)]
    pub ylag: usize,

    /// Maximum input lag `lu`.
    #[arg(long, default_value_t = 2)]
    pub ulag: usize,

    /// Disable the constant candidate term.
    #[arg(long)]
    pub no_constant: bool,
}

fn parse_cluster_key(s: &str) -> Result<ClusterKey, String> {
    let (p, m) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"p,m\" (factor counts), got {s:?}"))?;
    let output_factors = p
        .trim()
        .parse()
        .map_err(|e| format!("bad output-factor count {p:?}: {e}"))?;
    let input_factors = m
        .trim()
        .parse()
        .map_err(|e| format!("bad input-factor count {m:?}: {e}"))?;
    Ok(ClusterKey::new(output_factors, input_factors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_key_parsing() {
        assert_eq!(parse_cluster_key("2,0").unwrap(), ClusterKey::new(2, 0));
        assert_eq!(parse_cluster_key(" 1 , 1 ").unwrap(), ClusterKey::new(1, 1));
        assert!(parse_cluster_key("2").is_err());
        assert!(parse_cluster_key("a,b").is_err());
    }
}
