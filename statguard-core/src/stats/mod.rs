//! Feature statistics computation.
//!
//! This module produces per-feature summaries of a dataset:
//! - **Counts**: rows observed and missing values
//! - **Type inference**: numeric, categorical or free-form string
//! - **Numeric facts**: min, max, mean, standard deviation, quantile sketch
//! - **Categorical facts**: top-K value frequencies plus an "other" bucket
//!
//! Statistics are a pure function of the dataset snapshot: computing them
//! twice, or on a row-shuffled copy, gives the same aggregates.

mod categorical;
mod computer;
mod config;
mod models;
mod numeric;

pub use computer::StatisticsComputer;
pub use config::{DEFAULT_QUANTILE_BUCKETS, DEFAULT_TOP_K, StatisticsConfig};
pub use models::{
    CategoricalStats, FeatureStatistics, FeatureSummary, FeatureType, NumericStats, ValueCount,
};
