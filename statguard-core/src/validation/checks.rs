//! Per-feature checks.
//!
//! Each check compares one feature summary against its constraint and
//! returns at most one anomaly. The validator decides the order.

use crate::schema::{FeatureConstraint, Presence};
use crate::stats::{FeatureStatistics, FeatureSummary, FeatureType};

use super::config::ValidationConfig;
use super::drift::{l_infinity_distance, mean_shift};
use super::models::{Anomaly, AnomalyKind, DriftMetric, Measurement, Severity};

/// The schema names a feature the statistics do not contain.
pub(crate) fn feature_missing(constraint: &FeatureConstraint) -> Anomaly {
    Anomaly::for_feature(
        &constraint.name,
        AnomalyKind::FeatureMissing,
        Severity::Error,
        format!("feature '{}' is missing from the data", constraint.name),
        Measurement::None,
    )
}

/// Observed type incompatible with the required type.
///
/// A feature with no values carries no type evidence and always passes, as
/// does a constraint inferred from a feature that was always missing.
pub(crate) fn type_mismatch(
    constraint: &FeatureConstraint,
    summary: &FeatureSummary,
) -> Option<Anomaly> {
    if summary.present_count() == 0
        || !constraint.has_type_evidence()
        || constraint.feature_type.accepts(summary.feature_type)
    {
        return None;
    }
    Some(Anomaly::for_feature(
        &summary.name,
        AnomalyKind::TypeMismatch,
        Severity::Error,
        format!(
            "expected {} values, observed {}",
            constraint.feature_type, summary.feature_type
        ),
        Measurement::Types {
            expected: constraint.feature_type,
            observed: summary.feature_type,
        },
    ))
}

/// Missing values beyond what the constraint allows.
pub(crate) fn unexpected_missing(
    constraint: &FeatureConstraint,
    summary: &FeatureSummary,
    config: &ValidationConfig,
) -> Option<Anomaly> {
    let allowed = match constraint.presence {
        Presence::Required => 0.0,
        Presence::Optional {
            max_missing_fraction,
        } => max_missing_fraction,
    };
    let fraction = summary.missing_fraction();
    if summary.missing_count == 0 || fraction <= allowed {
        return None;
    }

    let severity = if fraction >= config.missing_error_fraction {
        Severity::Error
    } else {
        Severity::Warning
    };
    let description = if constraint.presence.is_required() {
        format!(
            "{} of {} values missing in a required feature",
            summary.missing_count, summary.count
        )
    } else {
        format!(
            "{:.1}% of values missing, at most {:.1}% allowed",
            fraction * 100.0,
            allowed * 100.0
        )
    };

    Some(Anomaly::for_feature(
        &summary.name,
        AnomalyKind::UnexpectedMissing,
        severity,
        description,
        Measurement::Missing {
            missing_count: summary.missing_count,
            missing_fraction: fraction,
            allowed_fraction: allowed,
        },
    ))
}

/// Observed numeric bounds outside the accepted range.
pub(crate) fn out_of_range(
    constraint: &FeatureConstraint,
    summary: &FeatureSummary,
) -> Option<Anomaly> {
    let (range, numeric) = (constraint.range.as_ref()?, summary.numeric.as_ref()?);
    if range.covers(numeric.min, numeric.max) {
        return None;
    }
    Some(Anomaly::for_feature(
        &summary.name,
        AnomalyKind::OutOfRange,
        Severity::Warning,
        format!(
            "observed range [{}, {}] exceeds expected [{}, {}]",
            numeric.min, numeric.max, range.min, range.max
        ),
        Measurement::Range {
            expected_min: range.min,
            expected_max: range.max,
            observed_min: numeric.min,
            observed_max: numeric.max,
        },
    ))
}

/// Values outside the accepted domain.
///
/// A closed domain rejects any unknown value, including anything hidden in
/// the overflow bucket. An open domain only rejects once the unknown share
/// exceeds its allowance.
pub(crate) fn unexpected_value(
    constraint: &FeatureConstraint,
    summary: &FeatureSummary,
    config: &ValidationConfig,
) -> Option<Anomaly> {
    let (domain, categorical) = (constraint.domain.as_ref()?, summary.categorical.as_ref()?);

    let unexpected: Vec<_> = categorical
        .entries
        .iter()
        .filter(|e| !domain.contains(&e.value))
        .collect();
    let unknown_count = unexpected
        .iter()
        .map(|e| e.count)
        .sum::<u64>()
        .saturating_add(categorical.other_count);
    let present = summary.present_count();
    if unknown_count == 0 || present == 0 {
        return None;
    }

    let fraction = unknown_count as f64 / present as f64;
    let allowed = if domain.open {
        domain.max_unknown_fraction
    } else {
        0.0
    };
    if domain.open && fraction <= allowed {
        return None;
    }

    let listed: Vec<String> = unexpected
        .iter()
        .take(config.max_listed_values)
        .map(|e| e.value.clone())
        .collect();

    let mut description = if listed.is_empty() {
        String::from("unlisted values outside the domain")
    } else {
        format!("unexpected values: {}", listed.join(", "))
    };
    if unexpected.len() > listed.len() {
        description.push_str(&format!(" (+{} more)", unexpected.len() - listed.len()));
    }
    if categorical.other_count > 0 {
        description.push_str(&format!(
            "; {} values in the overflow bucket",
            categorical.other_count
        ));
    }
    if domain.open {
        description.push_str(&format!(
            "; {:.1}% unknown, at most {:.1}% allowed",
            fraction * 100.0,
            allowed * 100.0
        ));
    }

    Some(Anomaly::for_feature(
        &summary.name,
        AnomalyKind::UnexpectedValue,
        Severity::Warning,
        description,
        Measurement::Values {
            unexpected: listed,
            unknown_count,
            unknown_fraction: fraction,
            allowed_fraction: allowed,
        },
    ))
}

/// Distribution shift relative to the reference summary of the same feature.
pub(crate) fn drift(
    summary: &FeatureSummary,
    reference: &FeatureSummary,
    config: &ValidationConfig,
) -> Option<Anomaly> {
    let (metric, distance, threshold) = match summary.feature_type {
        FeatureType::Numeric => {
            let threshold = config.numeric_drift_threshold?;
            let distance = mean_shift(summary.numeric.as_ref()?, reference.numeric.as_ref()?);
            (DriftMetric::MeanShift, distance, threshold)
        }
        FeatureType::Categorical | FeatureType::String => {
            let threshold = config.categorical_drift_threshold?;
            let distance = l_infinity_distance(
                summary.categorical.as_ref()?,
                reference.categorical.as_ref()?,
            )?;
            (DriftMetric::LInfinity, distance, threshold)
        }
    };
    if distance <= threshold {
        return None;
    }

    let description = match metric {
        DriftMetric::MeanShift => format!(
            "mean shifted by {:.3} reference standard deviations (threshold {})",
            distance, threshold
        ),
        DriftMetric::LInfinity => format!(
            "category frequencies moved by up to {:.3} (threshold {})",
            distance, threshold
        ),
    };
    Some(Anomaly::for_feature(
        &summary.name,
        AnomalyKind::Drift,
        Severity::Warning,
        description,
        Measurement::Distance {
            metric,
            distance,
            threshold,
        },
    ))
}

/// A feature the schema does not describe.
pub(crate) fn new_feature(summary: &FeatureSummary) -> Anomaly {
    Anomaly::for_feature(
        &summary.name,
        AnomalyKind::NewFeature,
        Severity::Warning,
        format!(
            "feature '{}' ({}) is not in the schema",
            summary.name, summary.feature_type
        ),
        Measurement::Feature {
            observed_type: summary.feature_type,
        },
    )
}

/// No rows, while the schema describes a non-empty dataset.
pub(crate) fn empty_dataset(statistics: &FeatureStatistics, source_row_count: u64) -> Option<Anomaly> {
    if statistics.row_count > 0 || source_row_count == 0 {
        return None;
    }
    Some(Anomaly::dataset_level(
        AnomalyKind::EmptyDataset,
        Severity::Error,
        format!("dataset has no rows; schema was built from {source_row_count}"),
        Measurement::Rows {
            observed_rows: statistics.row_count,
            reference_rows: source_row_count,
        },
    ))
}
