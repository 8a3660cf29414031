//! Feature statistics computer.
//!
//! Turns a [`Dataset`] into [`FeatureStatistics`]. Each column is summarized
//! independently, so columns can be processed in parallel and merged by
//! concatenation.

use tracing::{debug, info};

use crate::dataset::{Column, Dataset};
use crate::{Result, StatguardError};

use super::categorical::FrequencyTable;
use super::config::StatisticsConfig;
use super::models::{FeatureStatistics, FeatureSummary, FeatureType};
use super::numeric;

/// Computes per-feature statistical summaries.
///
/// # Example
///
/// ```rust
/// use statguard_core::dataset::{Column, Dataset};
/// use statguard_core::stats::{FeatureType, StatisticsComputer, StatisticsConfig};
///
/// let dataset = Dataset::new(vec![
///     Column::from_values("rating", [Some(4.0), Some(5.0), None]),
///     Column::from_values("category", ["Books", "Books", "Toys"]),
/// ])?;
///
/// let computer = StatisticsComputer::new(StatisticsConfig::default());
/// let stats = computer.compute(&dataset)?;
///
/// let rating = stats.feature("rating").unwrap();
/// assert_eq!(rating.feature_type, FeatureType::Numeric);
/// assert_eq!(rating.missing_count, 1);
/// # Ok::<(), statguard_core::StatguardError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatisticsComputer {
    config: StatisticsConfig,
}

impl StatisticsComputer {
    /// Creates a new computer with the given configuration.
    pub fn new(config: StatisticsConfig) -> Self {
        Self { config }
    }

    /// Creates a new computer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(StatisticsConfig::default())
    }

    /// Returns a reference to the computer configuration.
    pub fn config(&self) -> &StatisticsConfig {
        &self.config
    }

    /// Computes statistics for every column of the dataset.
    ///
    /// # Errors
    /// Returns [`StatguardError::EmptyDataset`] if the dataset has no
    /// columns, or a configuration error if the config is invalid. Zero rows
    /// is not an error: every count is zero.
    pub fn compute(&self, dataset: &Dataset) -> Result<FeatureStatistics> {
        self.config
            .validate()
            .map_err(|e| StatguardError::configuration(e.to_string()))?;

        if dataset.column_count() == 0 {
            return Err(StatguardError::EmptyDataset);
        }

        info!(
            "Computing statistics for {} columns x {} rows",
            dataset.column_count(),
            dataset.row_count()
        );

        let features = self.summarize_columns(dataset.columns());

        Ok(FeatureStatistics {
            row_count: dataset.row_count() as u64,
            features,
        })
    }

    #[cfg(feature = "parallel")]
    fn summarize_columns(&self, columns: &[Column]) -> Vec<FeatureSummary> {
        use rayon::prelude::*;

        if self.config.parallel {
            debug!("Summarizing columns on the rayon pool");
            // par_iter().collect() preserves input order
            columns
                .par_iter()
                .map(|column| self.summarize_column(column))
                .collect()
        } else {
            columns.iter().map(|c| self.summarize_column(c)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn summarize_columns(&self, columns: &[Column]) -> Vec<FeatureSummary> {
        if self.config.parallel {
            tracing::warn!("Parallel statistics requested but the 'parallel' feature is disabled");
        }
        columns.iter().map(|c| self.summarize_column(c)).collect()
    }

    /// Summarizes a single column.
    pub fn summarize_column(&self, column: &Column) -> FeatureSummary {
        let mut missing_count: u64 = 0;
        let mut numbers: Vec<f64> = Vec::new();
        let mut all_numeric = true;

        for value in column.values() {
            if value.is_missing() {
                missing_count += 1;
                continue;
            }
            match value.as_finite_number() {
                Some(n) => numbers.push(n),
                None => all_numeric = false,
            }
        }

        let count = column.len() as u64;

        let summary = if all_numeric {
            FeatureSummary {
                name: column.name().to_string(),
                count,
                missing_count,
                feature_type: FeatureType::Numeric,
                numeric: numeric::summarize(numbers, self.config.quantile_buckets),
                categorical: None,
            }
        } else {
            let mut table = FrequencyTable::default();
            for value in column.values().iter().filter(|v| !v.is_missing()) {
                if let Some(rendered) = value.render() {
                    table.push(rendered);
                }
            }

            let feature_type = if table.distinct_count() <= self.config.top_k {
                FeatureType::Categorical
            } else {
                FeatureType::String
            };

            FeatureSummary {
                name: column.name().to_string(),
                count,
                missing_count,
                feature_type,
                numeric: None,
                categorical: Some(table.into_stats(self.config.top_k)),
            }
        };

        debug!(
            "Column '{}': type={}, count={}, missing={}",
            summary.name, summary.feature_type, summary.count, summary.missing_count
        );

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;

    fn compute(columns: Vec<Column>) -> FeatureStatistics {
        StatisticsComputer::with_defaults()
            .compute(&Dataset::new(columns).unwrap())
            .unwrap()
    }

    #[test]
    fn test_zero_columns_is_empty_dataset_error() {
        let result = StatisticsComputer::with_defaults().compute(&Dataset::default());
        assert!(matches!(result, Err(StatguardError::EmptyDataset)));
    }

    #[test]
    fn test_zero_rows_yields_zero_counts() {
        let stats = compute(vec![
            Column::new("rating", Vec::new()),
            Column::new("category", Vec::new()),
        ]);

        assert_eq!(stats.row_count, 0);
        assert_eq!(stats.features.len(), 2);
        for feature in &stats.features {
            assert_eq!(feature.count, 0);
            assert_eq!(feature.missing_count, 0);
            assert!(feature.numeric.is_none());
        }
        assert!(stats.check().is_ok());
    }

    #[test]
    fn test_numeric_column() {
        let stats = compute(vec![Column::from_values(
            "rating",
            [Some(1.0), Some(3.0), None, Some(5.0)],
        )]);

        let rating = stats.feature("rating").unwrap();
        assert_eq!(rating.feature_type, FeatureType::Numeric);
        assert_eq!(rating.count, 4);
        assert_eq!(rating.missing_count, 1);

        let numeric = rating.numeric.as_ref().unwrap();
        assert_eq!(numeric.min, 1.0);
        assert_eq!(numeric.max, 5.0);
        assert_eq!(numeric.mean, 3.0);
        assert_eq!(numeric.quantiles.len(), 11);
    }

    #[test]
    fn test_numeric_text_is_numeric() {
        let stats = compute(vec![Column::from_values("n", ["1", "2.5", "-3"])]);
        let feature = stats.feature("n").unwrap();
        assert_eq!(feature.feature_type, FeatureType::Numeric);
        assert_eq!(feature.numeric.as_ref().unwrap().min, -3.0);
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let stats = compute(vec![Column::new(
            "score",
            vec![Value::from(1.0), Value::from(f64::NAN), Value::from("NaN")],
        )]);

        let score = stats.feature("score").unwrap();
        assert_eq!(score.missing_count, 2);
        assert_eq!(score.feature_type, FeatureType::Numeric);
        assert_eq!(score.numeric.as_ref().unwrap().mean, 1.0);
    }

    #[test]
    fn test_mixed_column_is_categorical() {
        let stats = compute(vec![Column::new(
            "mixed",
            vec![Value::from(1.0), Value::from("two"), Value::from(1.0)],
        )]);

        let mixed = stats.feature("mixed").unwrap();
        assert_eq!(mixed.feature_type, FeatureType::Categorical);
        let categorical = mixed.categorical.as_ref().unwrap();
        assert_eq!(categorical.count_of("1"), Some(2));
        assert_eq!(categorical.count_of("two"), Some(1));
    }

    #[test]
    fn test_high_cardinality_is_string() {
        let computer = StatisticsComputer::new(StatisticsConfig::new().with_top_k(2));
        let dataset = Dataset::new(vec![Column::from_values(
            "review",
            ["good", "bad", "great", "good"],
        )])
        .unwrap();

        let stats = computer.compute(&dataset).unwrap();
        let review = stats.feature("review").unwrap();
        assert_eq!(review.feature_type, FeatureType::String);

        let categorical = review.categorical.as_ref().unwrap();
        assert_eq!(categorical.entries.len(), 2);
        assert_eq!(categorical.entries[0].value, "good");
        assert_eq!(categorical.other_count, 1);
        assert_eq!(categorical.distinct_count, 3);
    }

    #[test]
    fn test_all_missing_column() {
        let stats = compute(vec![Column::new("empty", vec![Value::Missing; 3])]);
        let empty = stats.feature("empty").unwrap();
        assert_eq!(empty.missing_count, 3);
        assert_eq!(empty.feature_type, FeatureType::Numeric);
        assert!(empty.numeric.is_none());
    }

    #[test]
    fn test_recomputation_is_identical() {
        let columns = vec![
            Column::from_values("a", [Some(0.1), Some(0.7), None]),
            Column::from_values("b", ["x", "y", "x"]),
        ];
        let first = serde_json::to_vec(&compute(columns.clone())).unwrap();
        let second = serde_json::to_vec(&compute(columns)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dataset = Dataset::new(
            (0..8)
                .map(|i| {
                    Column::from_values(
                        format!("c{}", i),
                        (0..50).map(|j| f64::from(i * j) / 7.0),
                    )
                })
                .collect(),
        )
        .unwrap();

        let sequential = StatisticsComputer::with_defaults().compute(&dataset).unwrap();
        let parallel = StatisticsComputer::new(StatisticsConfig::new().with_parallel(true))
            .compute(&dataset)
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let computer = StatisticsComputer::new(StatisticsConfig {
            top_k: 0,
            ..StatisticsConfig::default()
        });
        let dataset = Dataset::new(vec![Column::from_values("a", [1.0])]).unwrap();
        assert!(matches!(
            computer.compute(&dataset),
            Err(StatguardError::Configuration { .. })
        ));
    }
}
