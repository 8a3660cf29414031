//! Distribution distance between two summaries of the same feature.

use std::collections::HashMap;

use crate::stats::{CategoricalStats, NumericStats};

/// Key under which the overflow bucket takes part in frequency comparisons.
const OVERFLOW_KEY: &str = "\u{0}other";

/// Largest absolute difference between the normalized frequencies of two
/// categorical summaries.
///
/// The overflow bucket is compared as one extra category. Returns `None` if
/// either side has no counted values.
pub fn l_infinity_distance(current: &CategoricalStats, reference: &CategoricalStats) -> Option<f64> {
    let current_total = current.total();
    let reference_total = reference.total();
    if current_total == 0 || reference_total == 0 {
        return None;
    }

    let current_freq = frequencies(current, current_total);
    let reference_freq = frequencies(reference, reference_total);

    let distance = current_freq
        .iter()
        .map(|(value, p)| (p - reference_freq.get(value).copied().unwrap_or(0.0)).abs())
        .chain(
            reference_freq
                .iter()
                .filter(|(value, _)| !current_freq.contains_key(*value))
                .map(|(_, q)| *q),
        )
        .fold(0.0_f64, f64::max);

    Some(distance)
}

fn frequencies(stats: &CategoricalStats, total: u64) -> HashMap<&str, f64> {
    let total = total as f64;
    let mut freq: HashMap<&str, f64> = stats
        .entries
        .iter()
        .map(|e| (e.value.as_str(), e.count as f64 / total))
        .collect();
    if stats.other_count > 0 {
        freq.insert(OVERFLOW_KEY, stats.other_count as f64 / total);
    }
    freq
}

/// Absolute difference of means, in reference standard deviations.
///
/// A constant reference has no spread to measure against; the shift is then
/// taken relative to `max(|reference mean|, 1)`.
pub fn mean_shift(current: &NumericStats, reference: &NumericStats) -> f64 {
    let scale = if reference.std_dev > 0.0 {
        reference.std_dev
    } else {
        reference.mean.abs().max(1.0)
    };
    ((current.mean - reference.mean).abs() / scale).min(f64::MAX)
}
