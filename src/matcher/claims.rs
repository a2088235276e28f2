use ahash::AHashMap;
use tracing::warn;

use super::cascade::{MatchTier, Resolution};
use super::index::BoundaryIndex;
use crate::config::ClaimPolicy;
use crate::types::{BeneficiaryAggregate, MatchedVillage, Unmatched, UnmatchedReason, VillageKey};

/// Outcome of one aggregate in the match report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Matched,
    /// Matched a polygon that another village already holds (shared policy).
    Shared,
    /// Resolved to a polygon that another village already holds (exclusive policy).
    Claimed,
    Unmatched,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Matched => "matched",
            MatchStatus::Shared => "shared",
            MatchStatus::Claimed => "claimed",
            MatchStatus::Unmatched => "unmatched",
        }
    }
}

/// One row of the match report.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchReportRow {
    pub key: VillageKey,
    pub beneficiary_count: u64,
    pub status: MatchStatus,
    pub tier: Option<MatchTier>,
    pub score: Option<f64>,
    /// Raw names of the boundary polygon the cascade selected.
    pub boundary: Option<VillageKey>,
}

/// Result of matching every aggregate, in key order.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    pub matched: Vec<MatchedVillage>,
    pub unmatched: Vec<Unmatched>,
    pub report: Vec<MatchReportRow>,
}

impl MatchSet {
    /// Number of matches per tier, in tier order.
    pub fn tier_counts(&self) -> [(MatchTier, usize); 4] {
        MatchTier::ALL.map(|tier| {
            let count = self.report.iter()
                .filter(|row| row.tier == Some(tier) && row.status != MatchStatus::Claimed && row.status != MatchStatus::Unmatched)
                .count();
            (tier, count)
        })
    }
}

/// Merge per-aggregate resolutions into a [`MatchSet`], enforcing `policy`.
///
/// `outcomes` must be in aggregate key order; the first aggregate to reach a
/// polygon is its claimant.
pub(crate) fn merge_claims(
    index: &BoundaryIndex,
    outcomes: Vec<(BeneficiaryAggregate, Option<Resolution>)>,
    policy: ClaimPolicy,
    state: &str,
) -> MatchSet {
    let mut claims: AHashMap<usize, VillageKey> = AHashMap::new();
    let mut set = MatchSet::default();

    for (aggregate, resolution) in outcomes {
        let BeneficiaryAggregate { key, beneficiary_count } = aggregate;

        let Some(resolution) = resolution else {
            set.report.push(MatchReportRow {
                key: key.clone(), beneficiary_count, status: MatchStatus::Unmatched,
                tier: None, score: None, boundary: None,
            });
            set.unmatched.push(Unmatched { key, reason: UnmatchedReason::NoCandidate });
            continue;
        };

        let polygon = index.get(resolution.polygon);
        let status = match (claims.get(&resolution.polygon), policy) {
            (None, _) => {
                claims.insert(resolution.polygon, key.clone());
                MatchStatus::Matched
            }
            (Some(_), ClaimPolicy::Shared) => MatchStatus::Shared,
            (Some(holder), ClaimPolicy::Exclusive) => {
                warn!("[matcher] {key} resolved to {} already claimed by {holder}", polygon.raw);
                set.unmatched.push(Unmatched {
                    key: key.clone(),
                    reason: UnmatchedReason::PolygonClaimed { by: holder.clone() },
                });
                MatchStatus::Claimed
            }
        };

        set.report.push(MatchReportRow {
            key: key.clone(),
            beneficiary_count,
            status,
            tier: Some(resolution.tier),
            score: Some(resolution.score),
            boundary: Some(polygon.raw.clone()),
        });

        if status != MatchStatus::Claimed {
            set.matched.push(MatchedVillage {
                state: state.to_string(),
                key,
                beneficiary_count,
                geometry: polygon.geometry.clone(),
            });
        }
    }

    set
}
