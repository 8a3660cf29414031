//! Statistics computation configuration.

use serde::{Deserialize, Serialize};

use crate::config::ConfigValidationError;

/// Default number of distinct values retained per categorical feature.
pub const DEFAULT_TOP_K: usize = 50;

/// Default number of quantile buckets (deciles).
pub const DEFAULT_QUANTILE_BUCKETS: usize = 10;

/// Upper bound on quantile buckets; beyond this the sketch stops being one.
pub const MAX_QUANTILE_BUCKETS: usize = 1000;

/// Controls how feature statistics are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Distinct values retained per categorical feature; the rest are
    /// aggregated into the "other" bucket
    pub top_k: usize,
    /// Number of quantile buckets; `quantile_buckets + 1` points are stored
    pub quantile_buckets: usize,
    /// Compute columns on the rayon thread pool
    pub parallel: bool,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            quantile_buckets: DEFAULT_QUANTILE_BUCKETS,
            parallel: false,
        }
    }
}

impl StatisticsConfig {
    /// Creates a new statistics config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the categorical top-K.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        if top_k == 0 {
            tracing::warn!("top_k 0 clamped to 1");
        }
        self.top_k = top_k.max(1);
        self
    }

    /// Builder method to set the number of quantile buckets.
    pub fn with_quantile_buckets(mut self, buckets: usize) -> Self {
        if !(1..=MAX_QUANTILE_BUCKETS).contains(&buckets) {
            tracing::warn!(
                "quantile_buckets {} clamped to valid range [1, {}]",
                buckets,
                MAX_QUANTILE_BUCKETS
            );
        }
        self.quantile_buckets = buckets.clamp(1, MAX_QUANTILE_BUCKETS);
        self
    }

    /// Builder method to enable column-parallel computation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_k == 0 {
            return Err(ConfigValidationError::InvalidTopK(self.top_k));
        }
        if !(1..=MAX_QUANTILE_BUCKETS).contains(&self.quantile_buckets) {
            return Err(ConfigValidationError::InvalidQuantileBuckets(
                self.quantile_buckets,
            ));
        }
        Ok(())
    }
}
