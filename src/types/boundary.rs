use geo::MultiPolygon;

use super::VillageKey;

/// An administrative village outline from the boundary dataset.
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    /// Position of the feature in the source dataset.
    pub source_index: usize,
    pub state: String,
    /// Names exactly as they appear in the source attributes.
    pub raw: VillageKey,
    /// Names after normalization; all comparisons use these.
    pub key: VillageKey,
    pub geometry: MultiPolygon<f64>,
}
