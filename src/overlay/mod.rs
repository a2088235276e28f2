//! Per-village raster overlay: clip, classify, vectorize and histogram.

mod batch;
mod classify;
mod stats;
mod village;

pub use batch::{overlay_villages, CancelToken, OverlayResult, VillageFault};
pub use classify::PixelClassifier;
pub use stats::StatsAggregator;
pub use village::{overlay_village, OverlayFault, VillageOverlay};
