//! Frequency counting with top-K retention.

use std::collections::HashMap;

use super::models::{CategoricalStats, ValueCount};

/// Distinct-value counter that remembers first-seen order.
#[derive(Debug, Default)]
pub(crate) struct FrequencyTable {
    positions: HashMap<String, usize>,
    counts: Vec<ValueCount>,
}

impl FrequencyTable {
    pub(crate) fn push(&mut self, value: String) {
        match self.positions.get(&value) {
            Some(&index) => self.counts[index].count += 1,
            None => {
                self.positions.insert(value.clone(), self.counts.len());
                self.counts.push(ValueCount { value, count: 1 });
            }
        }
    }

    pub(crate) fn distinct_count(&self) -> usize {
        self.counts.len()
    }

    /// Retains the `top_k` most frequent values and aggregates the rest.
    ///
    /// The sort is stable, so equal counts keep first-seen order.
    pub(crate) fn into_stats(self, top_k: usize) -> CategoricalStats {
        let distinct_count = self.counts.len() as u64;
        let mut entries = self.counts;
        entries.sort_by(|a, b| b.count.cmp(&a.count));

        let overflow = entries.split_off(top_k.min(entries.len()));
        let other_count = overflow.iter().map(|e| e.count).sum();

        CategoricalStats {
            distinct_count,
            entries,
            other_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(values: &[&str]) -> FrequencyTable {
        let mut table = FrequencyTable::default();
        for value in values {
            table.push(value.to_string());
        }
        table
    }

    #[test]
    fn test_counts_by_descending_frequency() {
        let stats = table(&["b", "a", "a", "c", "a", "b"]).into_stats(10);
        let values: Vec<_> = stats.entries.iter().map(|e| (e.value.as_str(), e.count)).collect();
        assert_eq!(values, vec![("a", 3), ("b", 2), ("c", 1)]);
        assert_eq!(stats.distinct_count, 3);
        assert_eq!(stats.other_count, 0);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let stats = table(&["z", "y", "x", "y", "z", "x"]).into_stats(10);
        let values: Vec<_> = stats.entries.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["z", "y", "x"]);
    }

    #[test]
    fn test_overflow_aggregates_into_other() {
        let stats = table(&["a", "a", "a", "b", "b", "c", "d"]).into_stats(2);
        assert_eq!(stats.entries.len(), 2);
        assert_eq!(stats.entries[0].value, "a");
        assert_eq!(stats.entries[1].value, "b");
        assert_eq!(stats.other_count, 2);
        assert_eq!(stats.distinct_count, 4);
        assert_eq!(stats.total(), 7);
    }

    #[test]
    fn test_empty_table() {
        let table = FrequencyTable::default();
        assert_eq!(table.distinct_count(), 0);
        let stats = table.into_stats(5);
        assert!(stats.entries.is_empty());
        assert_eq!(stats.other_count, 0);
    }
}
