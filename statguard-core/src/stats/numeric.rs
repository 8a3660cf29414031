//! Numeric aggregates: running moments and the quantile sketch.

use super::models::NumericStats;

/// Welford running mean/variance accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunningMoments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    pub(crate) fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub(crate) fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation (divides by n).
    pub(crate) fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.m2 / self.count as f64).max(0.0).sqrt()
    }
}

/// Magnitude above which moments are accumulated on rescaled values.
const RESCALE_ABOVE: f64 = 1e150;

/// Power-of-two divisor that brings `magnitude` down to at most `2^10`.
///
/// Dividing by a power of two is exact, so rescaling only loses precision
/// for values that would otherwise underflow.
fn rescale_factor(magnitude: f64) -> f64 {
    if magnitude <= RESCALE_ABOVE {
        return 1.0;
    }
    let exponent = magnitude.log2().ceil() as i32 - 10;
    2f64.powi(exponent)
}

/// Summarizes numeric values, or returns `None` when there are none.
///
/// Values are sorted before accumulation, so the result does not depend on
/// the order in which rows arrived. Finite input always yields finite
/// moments and quantiles, even near `f64::MAX`.
pub(crate) fn summarize(mut values: Vec<f64>, buckets: usize) -> Option<NumericStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let min = values[0];
    let max = values[values.len() - 1];

    let factor = rescale_factor(min.abs().max(max.abs()));
    let mut moments = RunningMoments::default();
    for &value in &values {
        moments.push(value / factor);
    }

    Some(NumericStats {
        min,
        max,
        mean: (moments.mean() * factor).clamp(min, max),
        std_dev: (moments.std_dev() * factor).min(f64::MAX),
        quantiles: quantiles(&values, buckets),
    })
}

/// Quantiles at ranks `0/b, 1/b, ..., b/b` with linear interpolation.
///
/// `sorted` must be non-empty and ascending.
pub(crate) fn quantiles(sorted: &[f64], buckets: usize) -> Vec<f64> {
    let last = sorted.len().saturating_sub(1);
    let buckets = buckets.max(1);

    (0..=buckets)
        .map(|i| {
            let position = (i as f64 / buckets as f64) * last as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let weight = position - lower as f64;
            let (low, high) = (sorted[lower], sorted[upper]);
            if weight == 0.0 || low == high {
                return low;
            }
            (low * (1.0 - weight) + high * weight).clamp(low, high)
        })
        .collect()
}
