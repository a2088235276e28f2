use std::collections::BTreeMap;

use landgrid::Clip;

use crate::types::{VillageKey, VillageLandStats};

/// Raw-code histograms, independent of the classifier table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAggregator;

impl StatsAggregator {
    /// Frequency of every distinct value.
    pub fn histogram(values: impl IntoIterator<Item = i64>) -> BTreeMap<i64, u64> {
        let mut counts = BTreeMap::new();
        for value in values {
            *counts.entry(value).or_insert(0u64) += 1;
        }
        counts
    }

    /// Stats row for the valid cells of a clip.
    pub fn village(key: VillageKey, clip: &Clip) -> VillageLandStats {
        VillageLandStats::new(key, Self::histogram(clip.values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_counts_each_value() {
        let hist = StatsAggregator::histogram([10, 40, 10, 7, 10]);
        assert_eq!(hist, BTreeMap::from([(7, 1), (10, 3), (40, 1)]));
        assert!(StatsAggregator::histogram([]).is_empty());
    }
}
