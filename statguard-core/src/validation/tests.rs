//! Scenario tests for the validator.
//!
//! Each test infers a schema from a baseline dataset and validates the
//! statistics of a second dataset against it.

use super::*;
use crate::dataset::{Column, Dataset, Value};
use crate::schema::{
    FeatureConstraint, InferenceConfig, NewFeaturePolicy, Schema, SchemaInferrer,
};
use crate::stats::{FeatureStatistics, FeatureType, StatisticsComputer, StatisticsConfig};
use crate::StatguardError;

fn stats_of(columns: Vec<Column>) -> FeatureStatistics {
    StatisticsComputer::with_defaults()
        .compute(&Dataset::new(columns).unwrap())
        .unwrap()
}

fn stats_with_top_k(columns: Vec<Column>, top_k: usize) -> FeatureStatistics {
    StatisticsComputer::new(StatisticsConfig::new().with_top_k(top_k))
        .compute(&Dataset::new(columns).unwrap())
        .unwrap()
}

fn schema_of(statistics: &FeatureStatistics) -> Schema {
    SchemaInferrer::with_defaults().infer(statistics).unwrap()
}

fn kinds(report: &AnomalyReport) -> Vec<AnomalyKind> {
    report.iter().map(|a| a.kind).collect()
}

fn baseline() -> Vec<Column> {
    vec![
        Column::from_values("rating", [1.0, 4.0, 5.0, 3.0, 2.0]),
        Column::from_values("category", ["A", "B", "A", "B", "A"]),
        Column::from_values("price", [Some(9.5), None, Some(12.0), Some(3.25), None]),
        Column::from_values("review", ["good", "bad", "fine", "great", "meh"]),
    ]
}

#[test]
fn test_self_validation_is_clean() {
    let statistics = stats_of(baseline());
    let schema = schema_of(&statistics);

    let report = Validator::with_defaults()
        .validate(&statistics, &schema)
        .unwrap();
    assert!(report.is_empty(), "unexpected anomalies: {:?}", report);
    assert!(!report.has_blocking_anomaly());
}

#[test]
fn test_self_validation_with_slack_is_clean() {
    let statistics = stats_of(baseline());
    let schema = SchemaInferrer::new(InferenceConfig::new().with_numeric_slack(0.1))
        .infer(&statistics)
        .unwrap();

    let report = Validator::with_defaults()
        .validate(&statistics, &schema)
        .unwrap();
    assert!(report.is_empty());
}

#[test]
fn test_single_null_in_required_feature() {
    let schema = schema_of(&stats_of(vec![Column::from_values(
        "rating",
        [1.0, 2.0, 3.0, 4.0],
    )]));
    let current = stats_of(vec![Column::from_values(
        "rating",
        [Some(1.0), Some(2.0), None, Some(4.0)],
    )]);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::UnexpectedMissing]);

    let anomaly = &report.anomalies()[0];
    assert_eq!(anomaly.feature.as_deref(), Some("rating"));
    assert_eq!(anomaly.severity, Severity::Warning);
    assert_eq!(
        anomaly.measured,
        Measurement::Missing {
            missing_count: 1,
            missing_fraction: 0.25,
            allowed_fraction: 0.0,
        }
    );
    assert!(!report.has_blocking_anomaly());
}

#[test]
fn test_fully_missing_required_feature_is_blocking() {
    let schema = schema_of(&stats_of(vec![Column::from_values("rating", [1.0, 2.0])]));
    let current = stats_of(vec![Column::new("rating", vec![Value::Missing; 2])]);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::UnexpectedMissing]);
    assert_eq!(report.anomalies()[0].severity, Severity::Error);
    assert!(report.has_blocking_anomaly());
}

#[test]
fn test_missing_error_fraction_escalates() {
    let schema = schema_of(&stats_of(vec![Column::from_values("a", [1.0, 2.0, 3.0, 4.0])]));
    let current = stats_of(vec![Column::from_values(
        "a",
        [None, None, Some(3.0), Some(4.0)],
    )]);

    let lenient = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(lenient.anomalies()[0].severity, Severity::Warning);

    let strict = Validator::new(ValidationConfig::new().with_missing_error_fraction(0.5))
        .validate(&current, &schema)
        .unwrap();
    assert_eq!(strict.anomalies()[0].severity, Severity::Error);
}

#[test]
fn test_optional_feature_over_allowance() {
    let schema = schema_of(&stats_of(vec![Column::from_values(
        "price",
        [Some(1.0), None, Some(3.0), Some(4.0)],
    )]));

    let within = stats_of(vec![Column::from_values(
        "price",
        [None, Some(2.0), Some(3.0), Some(4.0)],
    )]);
    assert!(Validator::with_defaults().validate(&within, &schema).unwrap().is_empty());

    let over = stats_of(vec![Column::from_values(
        "price",
        [None, None, Some(3.0), Some(4.0)],
    )]);
    let report = Validator::with_defaults().validate(&over, &schema).unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::UnexpectedMissing]);
    assert_eq!(
        report.anomalies()[0].measured,
        Measurement::Missing {
            missing_count: 2,
            missing_fraction: 0.5,
            allowed_fraction: 0.25,
        }
    );
}

#[test]
fn test_rating_out_of_range() {
    let schema = schema_of(&stats_of(vec![Column::from_values(
        "rating",
        [1.0, 2.0, 3.0, 4.0, 5.0],
    )]));
    let current = stats_of(vec![Column::from_values("rating", [1.0, 3.0, 7.0])]);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::OutOfRange]);

    let anomaly = &report.anomalies()[0];
    assert_eq!(anomaly.severity, Severity::Warning);
    assert_eq!(
        anomaly.measured,
        Measurement::Range {
            expected_min: 1.0,
            expected_max: 5.0,
            observed_min: 1.0,
            observed_max: 7.0,
        }
    );
}

#[test]
fn test_unexpected_category_value() {
    let schema = schema_of(&stats_of(vec![Column::from_values(
        "category",
        ["A", "B", "A"],
    )]));
    let current = stats_of(vec![Column::from_values("category", ["A", "B", "C"])]);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::UnexpectedValue]);

    let anomaly = &report.anomalies()[0];
    assert!(anomaly.description.contains('C'));
    match &anomaly.measured {
        Measurement::Values {
            unexpected,
            unknown_count,
            ..
        } => {
            assert_eq!(unexpected, &vec!["C".to_string()]);
            assert_eq!(*unknown_count, 1);
        }
        other => panic!("unexpected measurement {:?}", other),
    }
}

#[test]
fn test_listed_values_capped() {
    let schema = schema_of(&stats_of(vec![Column::from_values("category", ["A"])]));
    let current = stats_of(vec![Column::from_values("category", ["B", "C", "D"])]);

    let report = Validator::new(ValidationConfig::new().with_max_listed_values(2))
        .validate(&current, &schema)
        .unwrap();
    let anomaly = &report.anomalies()[0];
    match &anomaly.measured {
        Measurement::Values { unexpected, .. } => assert_eq!(unexpected.len(), 2),
        other => panic!("unexpected measurement {:?}", other),
    }
    assert!(anomaly.description.contains("+1 more"));
}

#[test]
fn test_closed_domain_flags_overflow_bucket() {
    let schema = schema_of(&stats_of(vec![Column::from_values("category", ["A", "B"])]));
    // top-K of 1 hides B in the overflow bucket
    let current = stats_with_top_k(vec![Column::from_values("category", ["A", "A", "B"])], 1);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::UnexpectedValue]);
    match &report.anomalies()[0].measured {
        Measurement::Values {
            unexpected,
            unknown_count,
            ..
        } => {
            assert!(unexpected.is_empty());
            assert_eq!(*unknown_count, 1);
        }
        other => panic!("unexpected measurement {:?}", other),
    }
}

#[test]
fn test_open_domain_tolerates_unknown_share() {
    let reference = stats_with_top_k(vec![Column::from_values("city", ["x", "x", "y", "z"])], 1);
    let schema = schema_of(&reference);

    let tolerated = stats_with_top_k(vec![Column::from_values("city", ["x", "x", "y", "w"])], 1);
    assert!(Validator::with_defaults().validate(&tolerated, &schema).unwrap().is_empty());

    let exceeded = stats_with_top_k(vec![Column::from_values("city", ["x", "q", "q", "q"])], 1);
    let report = Validator::with_defaults().validate(&exceeded, &schema).unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::UnexpectedValue]);
    match &report.anomalies()[0].measured {
        Measurement::Values {
            unknown_fraction,
            allowed_fraction,
            ..
        } => {
            assert_eq!(*unknown_fraction, 1.0);
            assert_eq!(*allowed_fraction, 0.5);
        }
        other => panic!("unexpected measurement {:?}", other),
    }
}

#[test]
fn test_feature_missing_skips_other_checks() {
    let schema = schema_of(&stats_of(vec![
        Column::from_values("a", [1.0, 2.0]),
        Column::from_values("b", [1.0, 2.0]),
    ]));
    let current = stats_of(vec![Column::from_values("a", [1.0, 2.0])]);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::FeatureMissing]);
    assert_eq!(report.anomalies()[0].feature.as_deref(), Some("b"));
    assert!(report.has_blocking_anomaly());
}

#[test]
fn test_extreme_magnitudes_self_validate() {
    for values in [[-1e308, 1e308], [-8e307, 8e307]] {
        let statistics = stats_of(vec![Column::from_values("x", values)]);
        assert!(statistics.check().is_ok());
        let schema = SchemaInferrer::new(InferenceConfig::new().with_numeric_slack(0.5))
            .infer(&statistics)
            .unwrap();

        let report = Validator::with_defaults()
            .validate_with_reference(&statistics, &schema, &statistics)
            .unwrap();
        assert!(report.is_empty(), "unexpected anomalies: {:?}", report);
    }
}

#[test]
fn test_type_mismatch_skips_value_checks() {
    let schema = schema_of(&stats_of(vec![Column::from_values("rating", [1.0, 5.0])]));
    let current = stats_of(vec![Column::from_values("rating", ["high", "low"])]);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::TypeMismatch]);
    assert_eq!(
        report.anomalies()[0].measured,
        Measurement::Types {
            expected: FeatureType::Numeric,
            observed: FeatureType::Categorical,
        }
    );
}

#[test]
fn test_textual_types_are_compatible() {
    let schema = schema_of(&stats_of(vec![Column::from_values("tag", ["a", "b", "a"])]));
    let current = stats_with_top_k(vec![Column::from_values("tag", ["a", "b", "a"])], 1);
    assert_eq!(current.features[0].feature_type, FeatureType::String);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(report.of_kind(AnomalyKind::TypeMismatch).count(), 0);
}

#[test]
fn test_all_missing_feature_has_no_type_evidence() {
    let schema = schema_of(&stats_of(vec![Column::from_values("tag", ["a", "b"])]));
    let current = stats_of(vec![Column::new("tag", vec![Value::Missing; 2])]);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::UnexpectedMissing]);
}

#[test]
fn test_schema_from_all_missing_feature_accepts_any_type() {
    let schema = schema_of(&stats_of(vec![
        Column::from_values("id", [1.0, 2.0, 3.0]),
        Column::new("note", vec![Value::Missing; 3]),
    ]));
    let current = stats_of(vec![
        Column::from_values("id", [1.0, 2.0, 3.0]),
        Column::from_values("note", ["a", "b", "c"]),
    ]);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert!(report.is_empty(), "unexpected anomalies: {:?}", report);
}

#[test]
fn test_new_feature_policy() {
    let statistics = stats_of(vec![Column::from_values("a", [1.0, 2.0])]);
    let current = stats_of(vec![
        Column::from_values("a", [1.0, 2.0]),
        Column::from_values("extra", ["x", "y"]),
    ]);

    let flagged = Validator::with_defaults()
        .validate(&current, &schema_of(&statistics))
        .unwrap();
    assert_eq!(kinds(&flagged), vec![AnomalyKind::NewFeature]);
    assert_eq!(flagged.anomalies()[0].feature.as_deref(), Some("extra"));
    assert_eq!(flagged.anomalies()[0].severity, Severity::Warning);

    let allowing = SchemaInferrer::new(InferenceConfig::new().with_new_features(NewFeaturePolicy::Allow))
        .infer(&statistics)
        .unwrap();
    assert!(Validator::with_defaults().validate(&current, &allowing).unwrap().is_empty());
}

#[test]
fn test_report_order() {
    let schema = schema_of(&stats_of(vec![
        Column::from_values("a", [1.0, 5.0]),
        Column::from_values("b", [1.0, 2.0]),
    ]));
    let current = stats_of(vec![
        Column::from_values("a", [None, Some(9.0)]),
        Column::from_values("c", [1.0, 2.0]),
    ]);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(
        kinds(&report),
        vec![
            AnomalyKind::UnexpectedMissing,
            AnomalyKind::OutOfRange,
            AnomalyKind::FeatureMissing,
            AnomalyKind::NewFeature,
        ]
    );
}

#[test]
fn test_empty_dataset_reported_last() {
    let schema = schema_of(&stats_of(vec![Column::from_values("a", [1.0, 2.0, 3.0])]));
    let current = stats_of(vec![
        Column::new("a", vec![]),
        Column::new("extra", vec![]),
    ]);
    assert_eq!(current.row_count, 0);

    let report = Validator::with_defaults().validate(&current, &schema).unwrap();
    assert_eq!(
        kinds(&report),
        vec![AnomalyKind::NewFeature, AnomalyKind::EmptyDataset]
    );

    let last = report.anomalies().last().unwrap();
    assert!(last.feature.is_none());
    assert_eq!(last.target(), DATASET_LEVEL);
    assert_eq!(
        last.measured,
        Measurement::Rows {
            observed_rows: 0,
            reference_rows: 3,
        }
    );
    assert!(report.has_blocking_anomaly());
}

#[test]
fn test_empty_schema_source_tolerates_empty_dataset() {
    let schema = Schema::new(
        vec![FeatureConstraint::new("a", FeatureType::Numeric)],
        NewFeaturePolicy::Flag,
        0,
    )
    .unwrap();
    let current = stats_of(vec![Column::new("a", vec![])]);
    assert!(Validator::with_defaults().validate(&current, &schema).unwrap().is_empty());
}

#[test]
fn test_categorical_drift() {
    let reference = stats_of(vec![Column::from_values("category", ["A", "A", "A", "B"])]);
    let schema = schema_of(&reference);
    let current = stats_of(vec![Column::from_values("category", ["A", "B", "B", "B"])]);

    let without = Validator::with_defaults()
        .validate_with_reference(&current, &schema, &reference)
        .unwrap();
    assert!(without.is_empty());

    let report = Validator::new(ValidationConfig::new().with_categorical_drift_threshold(0.2))
        .validate_with_reference(&current, &schema, &reference)
        .unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::Drift]);
    match &report.anomalies()[0].measured {
        Measurement::Distance {
            metric, distance, ..
        } => {
            assert_eq!(*metric, DriftMetric::LInfinity);
            assert!((distance - 0.5).abs() < 1e-12);
        }
        other => panic!("unexpected measurement {:?}", other),
    }
}

#[test]
fn test_numeric_drift() {
    let reference = stats_of(vec![Column::from_values("x", [1.0, 2.0, 3.0, 4.0, 5.0])]);
    let schema = schema_of(&reference);
    let shifted = stats_of(vec![Column::from_values("x", [4.0, 5.0, 5.0, 5.0, 5.0])]);
    let similar = stats_of(vec![Column::from_values("x", [1.0, 2.0, 3.0, 4.0, 5.0])]);

    let validator = Validator::new(ValidationConfig::new().with_numeric_drift_threshold(1.0));

    let report = validator
        .validate_with_reference(&shifted, &schema, &reference)
        .unwrap();
    assert_eq!(kinds(&report), vec![AnomalyKind::Drift]);
    assert_eq!(report.anomalies()[0].severity, Severity::Warning);

    assert!(validator
        .validate_with_reference(&similar, &schema, &reference)
        .unwrap()
        .is_empty());
}

#[test]
fn test_malformed_statistics_is_error() {
    let schema = schema_of(&stats_of(vec![Column::from_values("a", [1.0, 2.0])]));
    let mut current = stats_of(vec![Column::from_values("a", [1.0, 2.0])]);
    current.features[0].missing_count = 3;

    assert!(matches!(
        Validator::with_defaults().validate(&current, &schema),
        Err(StatguardError::StructuralInput { .. })
    ));
}

#[test]
fn test_duplicate_features_in_statistics_is_error() {
    let schema = schema_of(&stats_of(vec![Column::from_values("a", [1.0, 2.0])]));
    let mut current = stats_of(vec![Column::from_values("a", [1.0, 2.0])]);
    let duplicate = current.features[0].clone();
    current.features.push(duplicate);

    assert!(Validator::with_defaults().validate(&current, &schema).is_err());
}

#[test]
fn test_malformed_reference_is_error() {
    let reference = stats_of(vec![Column::from_values("a", [1.0, 2.0])]);
    let schema = schema_of(&reference);
    let mut broken = reference.clone();
    broken.row_count = 7;

    assert!(matches!(
        Validator::with_defaults().validate_with_reference(&reference, &schema, &broken),
        Err(StatguardError::StructuralInput { .. })
    ));
}

#[test]
fn test_invalid_config_is_error() {
    let statistics = stats_of(vec![Column::from_values("a", [1.0, 2.0])]);
    let schema = schema_of(&statistics);
    let validator = Validator::new(ValidationConfig {
        missing_error_fraction: 3.0,
        ..ValidationConfig::default()
    });

    assert!(matches!(
        validator.validate(&statistics, &schema),
        Err(StatguardError::Configuration { .. })
    ));
}
