//! Feature statistics data structures.
//!
//! These are plain, versioned records with explicit serde derives. Ordering
//! is always the dataset column order so that serialization is byte-stable.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Result, StatguardError};

/// Inferred type of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    /// Every non-missing value is a finite number
    Numeric,
    /// Textual values with a bounded number of distinct values
    Categorical,
    /// Textual values with more distinct values than the top-K retains
    String,
}

impl FeatureType {
    /// Returns true for the textual types.
    pub fn is_textual(&self) -> bool {
        matches!(self, FeatureType::Categorical | FeatureType::String)
    }

    /// Returns true if data of type `observed` satisfies a requirement of
    /// this type.
    ///
    /// Categorical and string only differ by cardinality, so they accept
    /// each other.
    pub fn accepts(&self, observed: FeatureType) -> bool {
        *self == observed || (self.is_textual() && observed.is_textual())
    }
}

impl std::fmt::Display for FeatureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureType::Numeric => write!(f, "numeric"),
            FeatureType::Categorical => write!(f, "categorical"),
            FeatureType::String => write!(f, "string"),
        }
    }
}

/// Distribution facts for a numeric feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    /// Smallest observed value
    pub min: f64,
    /// Largest observed value
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Values at evenly spaced ranks, from min to max inclusive
    pub quantiles: Vec<f64>,
}

/// Occurrence count of one distinct value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    /// The value as text
    pub value: String,
    /// Number of rows holding it
    pub count: u64,
}

/// Frequency facts for a categorical or string feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalStats {
    /// Number of distinct non-missing values, retained or not
    pub distinct_count: u64,
    /// Retained values by descending count, ties in first-seen order
    pub entries: Vec<ValueCount>,
    /// Total count of values not retained in `entries`
    pub other_count: u64,
}

impl CategoricalStats {
    /// Returns the retained count for `value`, if retained.
    pub fn count_of(&self, value: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.count)
    }

    /// Sum of retained counts plus the overflow bucket.
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| e.count)
            .sum::<u64>()
            .saturating_add(self.other_count)
    }
}

/// Statistical summary of a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    /// Feature (column) name
    pub name: String,
    /// Rows observed, missing included
    pub count: u64,
    /// Rows with a missing value
    pub missing_count: u64,
    /// Inferred type
    pub feature_type: FeatureType,
    /// Present for numeric features with at least one value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericStats>,
    /// Present for categorical and string features
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categorical: Option<CategoricalStats>,
}

impl FeatureSummary {
    /// Number of non-missing values.
    pub fn present_count(&self) -> u64 {
        self.count.saturating_sub(self.missing_count)
    }

    /// Fraction of rows that are missing (0.0 for an empty column).
    pub fn missing_fraction(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.missing_count as f64 / self.count as f64
        }
    }

    /// Checks internal consistency of the summary.
    pub fn check(&self, row_count: u64) -> Result<()> {
        if self.count != row_count {
            return Err(StatguardError::malformed_feature(
                &self.name,
                format!("count {} differs from row count {}", self.count, row_count),
            ));
        }
        if self.missing_count > self.count {
            return Err(StatguardError::malformed_feature(
                &self.name,
                format!(
                    "missing count {} exceeds count {}",
                    self.missing_count, self.count
                ),
            ));
        }

        if let Some(numeric) = &self.numeric {
            if self.feature_type != FeatureType::Numeric {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    format!("numeric facts on a {} feature", self.feature_type),
                ));
            }
            let all_finite = [numeric.min, numeric.max, numeric.mean, numeric.std_dev]
                .iter()
                .chain(&numeric.quantiles)
                .all(|v| v.is_finite());
            if !all_finite {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    "non-finite numeric facts",
                ));
            }
            if numeric.min > numeric.max {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    format!("min {} exceeds max {}", numeric.min, numeric.max),
                ));
            }
            if numeric.std_dev < 0.0 {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    "negative standard deviation",
                ));
            }
        } else if self.feature_type == FeatureType::Numeric && self.present_count() > 0 {
            return Err(StatguardError::malformed_feature(
                &self.name,
                "numeric feature without numeric facts",
            ));
        }

        if let Some(categorical) = &self.categorical {
            if !self.feature_type.is_textual() {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    format!("categorical facts on a {} feature", self.feature_type),
                ));
            }
            if categorical.total() != self.present_count() {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    format!(
                        "value counts sum to {}, expected {} present values",
                        categorical.total(),
                        self.present_count()
                    ),
                ));
            }
            if (categorical.entries.len() as u64) > categorical.distinct_count {
                return Err(StatguardError::malformed_feature(
                    &self.name,
                    "more retained entries than distinct values",
                ));
            }
        } else if self.feature_type.is_textual() && self.present_count() > 0 {
            return Err(StatguardError::malformed_feature(
                &self.name,
                "textual feature without value counts",
            ));
        }

        Ok(())
    }
}

/// Per-feature statistics of one dataset snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStatistics {
    /// Number of rows in the dataset
    pub row_count: u64,
    /// Feature summaries in dataset column order
    pub features: Vec<FeatureSummary>,
}

impl FeatureStatistics {
    /// Looks up a feature summary by name.
    pub fn feature(&self, name: &str) -> Option<&FeatureSummary> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Feature names in order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    /// Checks that feature names are unique and every summary is
    /// internally consistent.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for feature in &self.features {
            if !seen.insert(feature.name.as_str()) {
                return Err(StatguardError::structural(format!(
                    "duplicate feature '{}' in statistics",
                    feature.name
                )));
            }
            feature.check(self.row_count)?;
        }
        Ok(())
    }
}
