//! Subcommand implementations.
//!
//! Each function loads its inputs, runs one engine stage and persists the
//! result. Errors carry file context through `anyhow`; the caller decides the
//! exit status.

use anyhow::{Context, Result, bail};
use statguard_core::artifact::{Artifact, ArtifactFormat};
use statguard_core::dataset::Dataset;
use statguard_core::preprocess::{
    ImbalancePolicy, NoResampling, RandomOversampler, Resampler, SmoteOversampler,
    derive_sentiment, drop_duplicates, drop_missing, encode_categorical, normalize_text, rebalance,
};
use statguard_core::{
    AnomalyReport, EngineConfig, FeatureStatistics, Schema, SchemaInferrer, StatisticsComputer,
    Validator,
};
use tracing::{info, warn};

use crate::loader::{load_dataset, save_dataset};
use crate::output::{load_artifact, save_artifact, save_artifact_by_extension};
use crate::report::render_markdown;
use crate::{InferArgs, PreprocessArgs, ProfileArgs, ResamplerChoice, ValidateArgs};

fn resampler_for(args: &PreprocessArgs) -> Box<dyn Resampler> {
    match args.resampler {
        ResamplerChoice::None => Box::new(NoResampling),
        ResamplerChoice::Random => Box::new(RandomOversampler { seed: args.seed }),
        ResamplerChoice::Smote => Box::new(SmoteOversampler {
            k_neighbors: args.k_neighbors,
            seed: args.seed,
        }),
    }
}

/// Applies the requested cleaning steps in a fixed order: deduplication,
/// missing-value filtering, text normalization, label derivation, categorical
/// encoding and finally rebalancing.
pub fn apply_preprocessing(
    dataset: Dataset,
    args: &PreprocessArgs,
    config: &EngineConfig,
) -> Result<Dataset> {
    let mut dataset = dataset;

    if args.dedupe {
        let before = dataset.row_count();
        dataset = drop_duplicates(&dataset)?;
        info!("Removed {} duplicate rows", before - dataset.row_count());
    }

    if !args.drop_missing.is_empty() {
        let columns: Vec<&str> = args.drop_missing.iter().map(String::as_str).collect();
        let before = dataset.row_count();
        dataset = drop_missing(&dataset, &columns)?;
        info!(
            "Removed {} rows with missing values in {}",
            before - dataset.row_count(),
            args.drop_missing.join(", ")
        );
    }

    for column in &args.normalize_text {
        dataset = normalize_text(&dataset, column)?;
    }

    if let Some(source) = &args.sentiment_from {
        dataset = derive_sentiment(&dataset, source, &args.sentiment_column)?;
    }

    for column in &args.encode {
        dataset = encode_categorical(&dataset, column, &format!("{}_code", column))?;
    }

    match (&args.target, args.resampler) {
        (Some(target), _) => {
            let policy = args
                .imbalance_threshold
                .map_or_else(|| config.imbalance.clone(), ImbalancePolicy::new);
            let resampler = resampler_for(args);
            dataset = rebalance(&dataset, target, &policy, resampler.as_ref())?;
        }
        (None, ResamplerChoice::None) => {}
        (None, choice) => bail!("--resampler {:?} requires --target", choice),
    }

    Ok(dataset)
}

/// `statguard preprocess`
pub async fn preprocess(args: &PreprocessArgs, config: &EngineConfig) -> Result<Dataset> {
    let raw = load_dataset(&args.input)
        .await
        .with_context(|| format!("loading {}", args.input.display()))?;
    let processed = apply_preprocessing(raw, args, config)?;
    save_dataset(&processed, &args.output)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(processed)
}

async fn statistics_for(input: &std::path::Path, config: &EngineConfig) -> Result<FeatureStatistics> {
    let dataset = load_dataset(input)
        .await
        .with_context(|| format!("loading {}", input.display()))?;
    StatisticsComputer::new(config.statistics.clone())
        .compute(&dataset)
        .with_context(|| format!("computing statistics for {}", input.display()))
}

/// `statguard profile`
pub async fn profile(args: &ProfileArgs, config: &EngineConfig) -> Result<FeatureStatistics> {
    let statistics = statistics_for(&args.input, config).await?;

    let format = if args.binary {
        ArtifactFormat::Binary
    } else {
        ArtifactFormat::from_path(&args.output)
    };
    let artifact = Artifact::new(statistics);
    save_artifact(&artifact, &args.output, format)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;
    Ok(artifact.into_payload())
}

/// `statguard infer`
///
/// The schema and the optional reference statistics share one run id.
pub async fn infer(args: &InferArgs, config: &EngineConfig) -> Result<Schema> {
    let statistics = statistics_for(&args.input, config).await?;
    let schema = SchemaInferrer::new(config.inference.clone()).infer(&statistics)?;

    let schema_artifact = Artifact::new(schema);
    save_artifact_by_extension(&schema_artifact, &args.schema_out)
        .await
        .with_context(|| format!("writing {}", args.schema_out.display()))?;

    if let Some(stats_out) = &args.stats_out {
        let stats_artifact = Artifact::for_run(schema_artifact.run_id, statistics);
        save_artifact_by_extension(&stats_artifact, stats_out)
            .await
            .with_context(|| format!("writing {}", stats_out.display()))?;
    }

    info!(
        "Inferred schema with {} features from {}",
        schema_artifact.payload().features().len(),
        args.input.display()
    );
    Ok(schema_artifact.into_payload())
}

/// `statguard validate`
///
/// Writes the report (and optionally the statistics and a Markdown summary)
/// and returns it. Whether a blocking anomaly fails the run is decided by the
/// caller.
pub async fn validate(args: &ValidateArgs, config: &EngineConfig) -> Result<AnomalyReport> {
    let schema: Artifact<Schema> = load_artifact(&args.schema)
        .await
        .with_context(|| format!("loading schema {}", args.schema.display()))?;
    let reference: Option<Artifact<FeatureStatistics>> = match &args.reference {
        Some(path) => Some(
            load_artifact(path)
                .await
                .with_context(|| format!("loading reference statistics {}", path.display()))?,
        ),
        None => None,
    };

    let statistics = statistics_for(&args.input, config).await?;
    let validator = Validator::new(config.validation.clone());
    let report = match &reference {
        Some(reference) => {
            validator.validate_with_reference(&statistics, schema.payload(), reference.payload())?
        }
        None => validator.validate(&statistics, schema.payload())?,
    };

    for anomaly in &report {
        warn!(
            "{} {} on {}: {}",
            anomaly.severity,
            anomaly.kind,
            anomaly.target(),
            anomaly.description
        );
    }

    let report_artifact = Artifact::new(report);
    if let Some(stats_out) = &args.stats_out {
        let stats_artifact = Artifact::for_run(report_artifact.run_id, statistics);
        save_artifact_by_extension(&stats_artifact, stats_out)
            .await
            .with_context(|| format!("writing {}", stats_out.display()))?;
    }

    save_artifact_by_extension(&report_artifact, &args.report_out)
        .await
        .with_context(|| format!("writing {}", args.report_out.display()))?;

    if let Some(markdown_path) = &args.markdown {
        let markdown = render_markdown(&report_artifact, &args.input.display().to_string())?;
        crate::output::write_file(markdown_path, markdown.as_bytes())
            .await
            .with_context(|| format!("writing {}", markdown_path.display()))?;
    }

    Ok(report_artifact.into_payload())
}

/// Returns true when the run should exit with [`crate::EXIT_BLOCKING`].
pub fn fails_run(report: &AnomalyReport, fail_on_blocking: bool) -> bool {
    fail_on_blocking && report.has_blocking_anomaly()
}
