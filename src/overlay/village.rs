use landgrid::{polygonize, Grid, GridError};
use thiserror::Error;
use tracing::debug;

use super::{classify::PixelClassifier, stats::StatsAggregator};
use crate::types::{ClassPolygon, MatchedVillage, VillageKey, VillageLandStats};

/// Failure of one village's overlay step. Never aborts a batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OverlayFault {
    /// The village misses the raster, or covers only nodata cells.
    #[error("no valid raster cells inside the village")]
    EmptyIntersection,
    /// The raster could not be read for this geometry.
    #[error("raster access failed: {reason}")]
    RasterAccess { reason: String },
}

impl From<GridError> for OverlayFault {
    fn from(err: GridError) -> Self { OverlayFault::RasterAccess { reason: err.to_string() } }
}

/// Everything the overlay produced for one village.
#[derive(Debug, Clone)]
pub struct VillageOverlay {
    pub key: VillageKey,
    pub class_polygons: Vec<ClassPolygon>,
    pub stats: VillageLandStats,
}

/// Clip, classify, vectorize and histogram one village.
pub fn overlay_village(
    grid: &Grid,
    classifier: &PixelClassifier,
    village: &MatchedVillage,
) -> Result<VillageOverlay, OverlayFault> {
    let clip = grid.clip(&village.geometry)?.ok_or(OverlayFault::EmptyIntersection)?;

    let stats = StatsAggregator::village(village.key.clone(), &clip);
    let classes = classifier.classify_clip(&clip);
    let class_polygons: Vec<ClassPolygon> = polygonize(classes.view(), &clip.transform)
        .into_iter()
        .map(|shape| ClassPolygon {
            key: village.key.clone(),
            land_type: shape.value,
            geometry: shape.polygon,
            area_pixels: shape.cells as u64,
        })
        .collect();

    debug!(
        "[overlay] {}: {} cells, {} class polygons",
        village.key, stats.total_pixels, class_polygons.len()
    );

    Ok(VillageOverlay { key: village.key.clone(), class_polygons, stats })
}
