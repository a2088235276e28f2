use std::{collections::BTreeMap, fmt};

use geo::Polygon;
use serde::{Deserialize, Serialize};

use super::VillageKey;

/// Semantic land-cover classes produced by the pixel classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandType {
    TreeCover,
    Cropland,
    BuiltUp,
    WaterBodies,
}

impl LandType {
    pub const ALL: [LandType; 4] = [
        LandType::TreeCover,
        LandType::Cropland,
        LandType::BuiltUp,
        LandType::WaterBodies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandType::TreeCover => "tree_cover",
            LandType::Cropland => "cropland",
            LandType::BuiltUp => "built_up",
            LandType::WaterBodies => "water_bodies",
        }
    }
}

impl fmt::Display for LandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One contiguous same-class region inside a matched village.
#[derive(Debug, Clone)]
pub struct ClassPolygon {
    pub key: VillageKey,
    pub land_type: LandType,
    pub geometry: Polygon<f64>,
    pub area_pixels: u64,
}

/// Raw-code pixel histogram for one village.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VillageLandStats {
    pub key: VillageKey,
    /// Raw raster code → pixel count, nodata excluded.
    pub land_stats: BTreeMap<i64, u64>,
    pub total_pixels: u64,
}

impl VillageLandStats {
    /// Build from a histogram; `total_pixels` is derived so it always equals the sum.
    pub fn new(key: VillageKey, land_stats: BTreeMap<i64, u64>) -> Self {
        let total_pixels = land_stats.values().sum();
        Self { key, land_stats, total_pixels }
    }

    /// Stats row for a village with no valid cells.
    pub fn empty(key: VillageKey) -> Self { Self::new(key, BTreeMap::new()) }

    /// `land_stats` as a JSON object string, e.g. `{"10":52,"40":7}`.
    pub fn land_stats_json(&self) -> String {
        let object: serde_json::Map<String, serde_json::Value> = self.land_stats.iter()
            .map(|(code, count)| (code.to_string(), (*count).into()))
            .collect();
        serde_json::Value::Object(object).to_string()
    }
}
