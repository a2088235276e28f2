use std::fmt;

use geo::MultiPolygon;

use super::VillageKey;

/// A beneficiary village resolved to a boundary polygon.
///
/// Names and counts come from the beneficiary source; the geometry is copied
/// from the boundary polygon the matcher selected.
#[derive(Debug, Clone)]
pub struct MatchedVillage {
    pub state: String,
    pub key: VillageKey,
    pub beneficiary_count: u64,
    pub geometry: MultiPolygon<f64>,
}

/// Why an aggregate did not produce a matched village.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmatchedReason {
    /// No tier produced a candidate at or above the threshold.
    NoCandidate,
    /// The resolved polygon was already claimed by another village.
    PolygonClaimed { by: VillageKey },
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::NoCandidate => f.write_str("no_candidate"),
            UnmatchedReason::PolygonClaimed { by } => write!(f, "polygon_claimed:{by}"),
        }
    }
}

/// Diagnostic entry for an aggregate left out of the matched set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmatched {
    pub key: VillageKey,
    pub reason: UnmatchedReason,
}
