//! statguard command-line entry point.
//!
//! Parses flags, installs logging and dispatches to the pipeline stage.
//! Exit status is 0 on success, 1 on any error and 2 when
//! `validate --fail-on-blocking` finds a blocking anomaly.

use std::process::ExitCode;

use clap::Parser;
use statguard_cli::{Cli, Command, EXIT_BLOCKING, output, pipeline};
use statguard_core::init_logging;
use tracing::{error, info};

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = output::load_config(cli.global.config.as_deref()).await?;

    match &cli.command {
        Command::Preprocess(args) => {
            let dataset = pipeline::preprocess(args, &config).await?;
            info!(
                "Preprocessed dataset written to {} ({} rows)",
                args.output.display(),
                dataset.row_count()
            );
        }
        Command::Profile(args) => {
            let statistics = pipeline::profile(args, &config).await?;
            info!(
                "Profiled {} features over {} rows",
                statistics.features.len(),
                statistics.row_count
            );
        }
        Command::Infer(args) => {
            pipeline::infer(args, &config).await?;
        }
        Command::Validate(args) => {
            let report = pipeline::validate(args, &config).await?;
            if report.is_empty() {
                info!("No anomalies detected");
            } else {
                info!(
                    "{} anomalies detected, blocking: {}",
                    report.len(),
                    report.has_blocking_anomaly()
                );
            }
            if pipeline::fails_run(&report, args.fail_on_blocking) {
                error!("Blocking anomalies found, failing the run");
                return Ok(ExitCode::from(EXIT_BLOCKING));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
