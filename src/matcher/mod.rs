//! Hierarchical fuzzy matching of beneficiary villages to boundary polygons.

mod cascade;
mod claims;
mod index;
pub mod score;

pub use cascade::{HierarchicalMatcher, MatchTier, Resolution};
pub use claims::{MatchReportRow, MatchSet, MatchStatus};
pub use index::BoundaryIndex;
pub use score::Scorer;

use rayon::prelude::*;
use tracing::info;

use crate::config::ClaimPolicy;
use crate::types::BeneficiaryAggregate;

/// Resolve every aggregate against `index` and merge the claims.
///
/// Resolution runs in parallel; the merge is sequential in the order of
/// `aggregates`, which should be sorted by key for reproducible claims.
pub fn match_villages(
    index: &BoundaryIndex,
    aggregates: Vec<BeneficiaryAggregate>,
    scorer: &dyn Scorer,
    threshold: f64,
    policy: ClaimPolicy,
    state: &str,
) -> MatchSet {
    let matcher = HierarchicalMatcher::new(index, scorer, threshold);

    let outcomes: Vec<_> = aggregates.into_par_iter()
        .map(|aggregate| {
            let resolution = matcher.resolve(&aggregate.key);
            (aggregate, resolution)
        })
        .collect();

    let set = claims::merge_claims(index, outcomes, policy, state);

    let tiers = set.tier_counts()
        .iter()
        .map(|(tier, n)| format!("{tier}={n}"))
        .collect::<Vec<_>>()
        .join(" ");
    info!("[matcher] {} matched, {} unmatched ({tiers})", set.matched.len(), set.unmatched.len());

    set
}

#[cfg(test)]
mod tests {
    use ahash::AHashSet;
    use geo::MultiPolygon;

    use super::*;
    use crate::matcher::score::WeightedRatio;
    use crate::names::NameNormalizer;
    use crate::types::{aggregate_beneficiaries, BeneficiaryRecord, BoundaryPolygon};

    fn boundaries(normalizer: &NameNormalizer, rows: &[(&str, &str, &str)]) -> BoundaryIndex {
        BoundaryIndex::new(rows.iter().enumerate().map(|(i, (d, b, v))| BoundaryPolygon {
            source_index: i,
            state: "Odisha".into(),
            raw: crate::types::VillageKey::new(*d, *b, *v),
            key: normalizer.key(d, b, v),
            geometry: MultiPolygon(vec![]),
        }).collect())
    }

    #[test]
    fn matched_keys_are_unique_and_sorted() {
        let normalizer = NameNormalizer::default();
        let index = boundaries(&normalizer, &[
            ("Angul", "Banarpal", "Kumursingha"),
            ("Angul", "Banarpal", "Badakera"),
            ("Baleswar", "Remuna", "Gudu"),
        ]);
        let records = vec![
            BeneficiaryRecord::new("Balasore", "Remuna", "Gudu", Some(2)),
            BeneficiaryRecord::new("anugul", "banarpal", "kumursingha", None),
            BeneficiaryRecord::new("Angul ", "Banarpal", "Kumursingha", Some(4)),
            BeneficiaryRecord::new("Angul", "Banarpal", "Badakeraa", Some(1)),
            BeneficiaryRecord::new("Angul", "Banarpal", "Nowhere", Some(1)),
        ];
        let aggregates = aggregate_beneficiaries(records, &normalizer).unwrap();

        let set = match_villages(&index, aggregates, &WeightedRatio, 85.0, ClaimPolicy::Exclusive, "Odisha");

        let keys: Vec<_> = set.matched.iter().map(|m| m.key.clone()).collect();
        let unique: AHashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());

        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        assert_eq!(set.matched.len(), 3);
        let kumur = set.matched.iter().find(|m| m.key.village == "kumursingha").unwrap();
        assert_eq!(kumur.beneficiary_count, 5);
        assert_eq!(set.unmatched.len(), 1);
        assert_eq!(set.unmatched[0].key.village, "nowhere");
        assert_eq!(set.report.len(), 4);
    }
}
