//! Command-line pipeline around the statguard engine.
//!
//! The binary reads CSV datasets and persisted artifacts, drives the engine
//! and writes the results back to disk. All file I/O and every pass/fail
//! decision lives here; the engine only sees in-memory values.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod loader;
pub mod output;
pub mod pipeline;
pub mod report;

/// Exit status used when `--fail-on-blocking` is set and the report contains
/// a blocking anomaly.
pub const EXIT_BLOCKING: u8 = 2;

/// Command-line interface for the statguard pipeline
#[derive(Parser)]
#[command(name = "statguard")]
#[command(about = "Dataset profiling, schema inference and anomaly detection")]
#[command(version)]
#[command(long_about = "
statguard - schema-driven statistics and anomaly detection for tabular data

A typical run profiles a trusted dataset once, infers a schema from it and
then validates every new batch against that schema:

  statguard infer --input baseline.csv --schema-out schema.json --stats-out reference.sgb
  statguard validate --input batch.csv --schema schema.json --reference reference.sgb \\
      --report-out report.json --markdown report.md --fail-on-blocking

Artifacts ending in .sgb use the compact binary form, everything else is
written as pretty-printed JSON.
")]
pub struct Cli {
    /// Global flags shared by all subcommands
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted before or after any subcommand.
#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,

    /// Engine configuration file
    #[arg(
        long,
        global = true,
        env = "STATGUARD_CONFIG",
        help = "JSON engine configuration (thresholds, top-k, slack)"
    )]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Clean and rebalance a raw CSV dataset
    Preprocess(PreprocessArgs),
    /// Compute feature statistics for a dataset
    Profile(ProfileArgs),
    /// Infer a schema from a trusted dataset
    Infer(InferArgs),
    /// Validate a dataset against a schema
    Validate(ValidateArgs),
}

/// Resampling strategy applied to the target column.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResamplerChoice {
    /// Leave the class distribution as it is
    #[default]
    None,
    /// Duplicate random minority rows
    Random,
    /// Interpolate synthetic minority rows
    Smote,
}

/// Arguments of `statguard preprocess`
#[derive(Args, Debug, Clone)]
pub struct PreprocessArgs {
    /// Raw CSV input
    #[arg(short, long)]
    pub input: PathBuf,

    /// Processed CSV output
    #[arg(short, long)]
    pub output: PathBuf,

    /// Drop exact duplicate rows
    #[arg(long)]
    pub dedupe: bool,

    /// Drop rows with a missing value in any of these columns
    #[arg(long, value_delimiter = ',')]
    pub drop_missing: Vec<String>,

    /// Lowercase these text columns and strip punctuation
    #[arg(long, value_delimiter = ',')]
    pub normalize_text: Vec<String>,

    /// Derive a negative/neutral/positive label from this rating column
    #[arg(long)]
    pub sentiment_from: Option<String>,

    /// Name of the derived sentiment column
    #[arg(long, default_value = "sentiment")]
    pub sentiment_column: String,

    /// Add integer codes for these categorical columns (as `<column>_code`)
    #[arg(long, value_delimiter = ',')]
    pub encode: Vec<String>,

    /// Class column used for rebalancing
    #[arg(long)]
    pub target: Option<String>,

    /// Resampling strategy for an imbalanced target
    #[arg(long, value_enum, default_value_t = ResamplerChoice::None)]
    pub resampler: ResamplerChoice,

    /// Majority/minority ratio above which resampling runs
    #[arg(long)]
    pub imbalance_threshold: Option<f64>,

    /// Seed for the resampler
    #[arg(long, default_value_t = statguard_core::preprocess::DEFAULT_SEED)]
    pub seed: u64,

    /// Neighbours considered by SMOTE
    #[arg(long, default_value_t = statguard_core::preprocess::DEFAULT_K_NEIGHBORS)]
    pub k_neighbors: usize,
}

/// Arguments of `statguard profile`
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// CSV dataset
    #[arg(short, long)]
    pub input: PathBuf,

    /// Statistics artifact to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Write the binary form regardless of the file extension
    #[arg(long)]
    pub binary: bool,
}

/// Arguments of `statguard infer`
#[derive(Args, Debug, Clone)]
pub struct InferArgs {
    /// Trusted CSV dataset
    #[arg(short, long)]
    pub input: PathBuf,

    /// Schema artifact to write
    #[arg(long)]
    pub schema_out: PathBuf,

    /// Also keep the statistics as a reference for later drift checks
    #[arg(long)]
    pub stats_out: Option<PathBuf>,
}

/// Arguments of `statguard validate`
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// CSV dataset to validate
    #[arg(short, long)]
    pub input: PathBuf,

    /// Schema artifact
    #[arg(long)]
    pub schema: PathBuf,

    /// Reference statistics artifact for drift checks
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Write the computed statistics here
    #[arg(long)]
    pub stats_out: Option<PathBuf>,

    /// Anomaly report artifact to write
    #[arg(long)]
    pub report_out: PathBuf,

    /// Markdown summary to write
    #[arg(long)]
    pub markdown: Option<PathBuf>,

    /// Exit with status 2 when the report has a blocking anomaly
    #[arg(long)]
    pub fail_on_blocking: bool,
}
