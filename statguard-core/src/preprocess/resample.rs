//! Class balancing by oversampling minority classes.
//!
//! A [`Resampler`] grows every class of a target column to the size of the
//! largest one. [`ImbalancePolicy`] decides whether that is worth doing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ConfigValidationError;
use crate::dataset::{Dataset, Value};
use crate::{Result, StatguardError};

/// Default max/min class ratio above which resampling is applied.
pub const DEFAULT_IMBALANCE_RATIO: f64 = 1.5;

/// Default seed for reproducible resampling.
pub const DEFAULT_SEED: u64 = 42;

/// Default neighbour count for synthetic oversampling.
pub const DEFAULT_K_NEIGHBORS: usize = 5;

/// Decides when a dataset is imbalanced enough to resample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImbalancePolicy {
    /// Resample when the max/min class ratio exceeds this value
    pub ratio_threshold: f64,
}

impl Default for ImbalancePolicy {
    fn default() -> Self {
        Self {
            ratio_threshold: DEFAULT_IMBALANCE_RATIO,
        }
    }
}

impl ImbalancePolicy {
    /// Creates a policy with the given threshold, clamped to at least 1.0.
    pub fn new(ratio_threshold: f64) -> Self {
        if !ratio_threshold.is_finite() || ratio_threshold < 1.0 {
            tracing::warn!("ratio_threshold {} clamped to 1.0", ratio_threshold);
            return Self {
                ratio_threshold: 1.0,
            };
        }
        Self { ratio_threshold }
    }

    /// Returns true if a dataset with the given class ratio needs resampling.
    pub fn requires_resampling(&self, ratio: f64) -> bool {
        ratio > self.ratio_threshold
    }

    /// Validates the policy.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !self.ratio_threshold.is_finite() || self.ratio_threshold < 1.0 {
            return Err(ConfigValidationError::InvalidImbalanceRatio(
                self.ratio_threshold,
            ));
        }
        Ok(())
    }
}

/// Per-class row indices, in first-seen class order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassIndex {
    classes: Vec<(String, Vec<usize>)>,
}

impl ClassIndex {
    /// Groups the rows of `dataset` by the rendered value of `target`.
    ///
    /// Rows with a missing target belong to no class.
    pub fn build(dataset: &Dataset, target: &str) -> Result<Self> {
        let column = dataset.column(target).ok_or_else(|| {
            StatguardError::structural(format!("unknown target column '{}'", target))
        })?;

        let mut classes: Vec<(String, Vec<usize>)> = Vec::new();
        for (row, value) in column.values().iter().enumerate() {
            if value.is_missing() {
                continue;
            }
            let Some(label) = value.render() else {
                continue;
            };
            match classes.iter_mut().find(|(existing, _)| *existing == label) {
                Some((_, rows)) => rows.push(row),
                None => classes.push((label, vec![row])),
            }
        }
        Ok(Self { classes })
    }

    /// Class labels with their row counts.
    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.classes
            .iter()
            .map(|(label, rows)| (label.as_str(), rows.len()))
            .collect()
    }

    /// Max class count divided by min class count, `None` without classes.
    pub fn imbalance_ratio(&self) -> Option<f64> {
        let max = self.classes.iter().map(|(_, rows)| rows.len()).max()?;
        let min = self.classes.iter().map(|(_, rows)| rows.len()).min()?;
        Some(max as f64 / min as f64)
    }

    fn largest(&self) -> usize {
        self.classes
            .iter()
            .map(|(_, rows)| rows.len())
            .max()
            .unwrap_or(0)
    }

    /// Classes smaller than the largest one, with how many rows each lacks.
    fn deficits(&self) -> impl Iterator<Item = (&str, &[usize], usize)> {
        let largest = self.largest();
        self.classes
            .iter()
            .filter(move |(_, rows)| rows.len() < largest)
            .map(move |(label, rows)| (label.as_str(), rows.as_slice(), largest - rows.len()))
    }
}

/// Ratio of the largest to the smallest class of `target`.
///
/// Returns `None` when the column has no non-missing values.
pub fn class_imbalance_ratio(dataset: &Dataset, target: &str) -> Result<Option<f64>> {
    Ok(ClassIndex::build(dataset, target)?.imbalance_ratio())
}

/// Strategy for balancing classes of a target column.
pub trait Resampler {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns a dataset in which every class of `target` has as many rows
    /// as the largest class. Original rows come first, in their order.
    fn resample(&self, dataset: &Dataset, target: &str) -> Result<Dataset>;
}

/// Leaves the dataset unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResampling;

impl Resampler for NoResampling {
    fn name(&self) -> &'static str {
        "none"
    }

    fn resample(&self, dataset: &Dataset, _target: &str) -> Result<Dataset> {
        Ok(dataset.clone())
    }
}

/// Duplicates randomly chosen minority rows.
#[derive(Debug, Clone, Copy)]
pub struct RandomOversampler {
    /// RNG seed
    pub seed: u64,
}

impl Default for RandomOversampler {
    fn default() -> Self {
        Self { seed: DEFAULT_SEED }
    }
}

impl Resampler for RandomOversampler {
    fn name(&self) -> &'static str {
        "random"
    }

    fn resample(&self, dataset: &Dataset, target: &str) -> Result<Dataset> {
        let index = ClassIndex::build(dataset, target)?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut rows: Vec<usize> = (0..dataset.row_count()).collect();
        for (label, members, deficit) in index.deficits() {
            debug!("Duplicating {} rows of class '{}'", deficit, label);
            rows.extend((0..deficit).map(|_| members[rng.random_range(0..members.len())]));
        }
        dataset.select_rows(&rows)
    }
}

/// Synthesizes minority rows by interpolating between a row and one of its
/// nearest neighbours of the same class.
///
/// Only columns whose present values are all numbers are interpolated. Other
/// columns, the target included, are copied from the base row. A class with
/// a single row has no neighbours, so that row is duplicated instead.
#[derive(Debug, Clone, Copy)]
pub struct SmoteOversampler {
    /// Neighbours considered per base row
    pub k_neighbors: usize,
    /// RNG seed
    pub seed: u64,
}

impl Default for SmoteOversampler {
    fn default() -> Self {
        Self {
            k_neighbors: DEFAULT_K_NEIGHBORS,
            seed: DEFAULT_SEED,
        }
    }
}

impl SmoteOversampler {
    fn numeric_columns(dataset: &Dataset, target: &str) -> Vec<usize> {
        dataset
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| column.name() != target)
            .filter(|(_, column)| {
                let mut present = column.values().iter().filter(|v| !v.is_missing()).peekable();
                present.peek().is_some() && present.all(|v| matches!(v, Value::Number(_)))
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Euclidean distance over the numeric coordinates both rows have.
    fn distance(dataset: &Dataset, numeric: &[usize], a: usize, b: usize) -> f64 {
        let columns = dataset.columns();
        numeric
            .iter()
            .filter_map(|&c| {
                let values = columns[c].values();
                Some((values[a].as_finite_number()? - values[b].as_finite_number()?).powi(2))
            })
            .sum::<f64>()
            .sqrt()
    }

    fn nearest(&self, dataset: &Dataset, numeric: &[usize], base: usize, members: &[usize]) -> Vec<usize> {
        let mut candidates: Vec<(f64, usize)> = members
            .iter()
            .filter(|&&m| m != base)
            .map(|&m| (Self::distance(dataset, numeric, base, m), m))
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        candidates
            .into_iter()
            .take(self.k_neighbors.max(1))
            .map(|(_, m)| m)
            .collect()
    }

    fn synthesize(
        dataset: &Dataset,
        numeric: &[usize],
        base: usize,
        neighbor: usize,
        gap: f64,
    ) -> Vec<Value> {
        dataset
            .columns()
            .iter()
            .enumerate()
            .map(|(c, column)| {
                let values = column.values();
                if numeric.contains(&c)
                    && let (Some(x), Some(y)) = (
                        values[base].as_finite_number(),
                        values[neighbor].as_finite_number(),
                    )
                {
                    return Value::Number(x + gap * (y - x));
                }
                values[base].clone()
            })
            .collect()
    }
}

impl Resampler for SmoteOversampler {
    fn name(&self) -> &'static str {
        "smote"
    }

    fn resample(&self, dataset: &Dataset, target: &str) -> Result<Dataset> {
        let index = ClassIndex::build(dataset, target)?;
        let numeric = Self::numeric_columns(dataset, target);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut synthetic: Vec<Vec<Value>> = Vec::new();
        for (label, members, deficit) in index.deficits() {
            debug!(
                "Synthesizing {} rows of class '{}' from {} members",
                deficit,
                label,
                members.len()
            );
            let neighbors: Vec<Vec<usize>> = members
                .iter()
                .map(|&m| self.nearest(dataset, &numeric, m, members))
                .collect();

            for _ in 0..deficit {
                let pick = rng.random_range(0..members.len());
                let base = members[pick];
                let row = match neighbors[pick].as_slice() {
                    [] => Self::synthesize(dataset, &numeric, base, base, 0.0),
                    candidates => {
                        let neighbor = candidates[rng.random_range(0..candidates.len())];
                        let gap: f64 = rng.random();
                        Self::synthesize(dataset, &numeric, base, neighbor, gap)
                    }
                };
                synthetic.push(row);
            }
        }

        if synthetic.is_empty() {
            return Ok(dataset.clone());
        }
        let headers = dataset
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        dataset.append(&Dataset::from_rows(headers, synthetic)?)
    }
}

/// Applies `resampler` to `target` when `policy` judges the classes
/// imbalanced. Otherwise returns an unchanged copy.
pub fn rebalance(
    dataset: &Dataset,
    target: &str,
    policy: &ImbalancePolicy,
    resampler: &dyn Resampler,
) -> Result<Dataset> {
    policy
        .validate()
        .map_err(|e| StatguardError::configuration(e.to_string()))?;

    let index = ClassIndex::build(dataset, target)?;
    info!("Initial class distribution of '{}': {:?}", target, index.counts());

    let Some(ratio) = index.imbalance_ratio() else {
        return Ok(dataset.clone());
    };
    if !policy.requires_resampling(ratio) {
        debug!(
            "Imbalance ratio {:.2} within threshold {:.2}",
            ratio, policy.ratio_threshold
        );
        return Ok(dataset.clone());
    }

    info!(
        "Imbalance ratio {:.2} exceeds {:.2}, applying '{}' resampling",
        ratio,
        policy.ratio_threshold,
        resampler.name()
    );
    let balanced = resampler.resample(dataset, target)?;
    info!(
        "Balanced class distribution of '{}': {:?}",
        target,
        ClassIndex::build(&balanced, target)?.counts()
    );
    Ok(balanced)
}
