use std::fmt;

use tracing::debug;

use super::index::BoundaryIndex;
use super::score::Scorer;
use crate::types::VillageKey;

/// Stage of the cascade that produced a match, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    Exact,
    Block,
    District,
    Global,
}

impl MatchTier {
    pub const ALL: [MatchTier; 4] = [MatchTier::Exact, MatchTier::Block, MatchTier::District, MatchTier::Global];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Block => "block",
            MatchTier::District => "district",
            MatchTier::Global => "global",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A polygon selected for one aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Canonical position in the [`BoundaryIndex`].
    pub polygon: usize,
    pub tier: MatchTier,
    pub score: f64,
}

/// Resolves village keys to boundary polygons through the four-tier cascade:
/// exact key, fuzzy within block, fuzzy within district, fuzzy over everything.
///
/// Fuzzy tiers compare village names only; the scope restriction supplies the
/// district and block agreement. A tier ends the cascade only when it yields
/// a candidate scoring at least `threshold`.
pub struct HierarchicalMatcher<'a> {
    index: &'a BoundaryIndex,
    scorer: &'a dyn Scorer,
    threshold: f64,
}

impl<'a> HierarchicalMatcher<'a> {
    pub fn new(index: &'a BoundaryIndex, scorer: &'a dyn Scorer, threshold: f64) -> Self {
        Self { index, scorer, threshold }
    }

    #[inline] pub fn index(&self) -> &'a BoundaryIndex { self.index }

    #[inline] pub fn threshold(&self) -> f64 { self.threshold }

    /// Resolve one normalized key, or `None` once every tier is exhausted.
    pub fn resolve(&self, key: &VillageKey) -> Option<Resolution> {
        for tier in MatchTier::ALL {
            if let Some(resolution) = self.try_tier(tier, key) {
                debug!(
                    "[matcher] {key} -> {} via {tier} ({:.1})",
                    self.index.get(resolution.polygon).key, resolution.score
                );
                return Some(resolution);
            }
        }
        debug!("[matcher] {key} unmatched");
        None
    }

    /// Attempt a single tier.
    pub fn try_tier(&self, tier: MatchTier, key: &VillageKey) -> Option<Resolution> {
        let candidates = match tier {
            MatchTier::Exact => {
                return self.index.exact(key).first()
                    .map(|&polygon| Resolution { polygon, tier, score: 100.0 });
            }
            MatchTier::Block => self.index.in_block(key),
            MatchTier::District => self.index.in_district(key),
            MatchTier::Global => self.index.all(),
        };

        self.best(candidates, &key.village)
            .map(|(polygon, score)| Resolution { polygon, tier, score })
    }

    /// Highest-scoring candidate at or above threshold; the earliest wins ties.
    fn best(&self, candidates: &[usize], village: &str) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for &idx in candidates {
            let score = self.scorer.score(village, &self.index.get(idx).key.village);
            if score < self.threshold { continue }
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((idx, score));
            }
        }
        best
    }
}
