use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use landgrid::Grid;
use rayon::prelude::*;
use tracing::{info, warn};

use super::{
    classify::PixelClassifier,
    village::{overlay_village, OverlayFault},
};
use crate::types::{ClassPolygon, MatchedVillage, VillageKey, VillageLandStats};

/// Cooperative cancellation flag, checked before each village starts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self { Self::default() }

    pub fn cancel(&self) { self.0.store(true, Ordering::SeqCst) }

    #[inline] pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

/// A village whose overlay failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VillageFault {
    pub key: VillageKey,
    pub fault: OverlayFault,
}

/// Merged overlay output for a batch of villages, in village order.
#[derive(Debug, Clone, Default)]
pub struct OverlayResult {
    pub class_polygons: Vec<ClassPolygon>,
    pub land_stats: Vec<VillageLandStats>,
    /// Villages whose raster access failed; they have no stats row.
    pub faults: Vec<VillageFault>,
    /// Villages never started because the run was cancelled.
    pub skipped: Vec<VillageKey>,
    /// Number of villages with no valid cells.
    pub empty: usize,
    pub cancelled: bool,
}

enum Outcome {
    Done(Result<super::VillageOverlay, OverlayFault>),
    Skipped,
}

/// Overlay every village on `grid` in parallel.
///
/// Each village is processed independently and returns its own result; the
/// results are then folded in input order. A village with no valid cells
/// gets an empty stats row. A raster fault is recorded and the batch goes on.
pub fn overlay_villages(
    grid: &Grid,
    classifier: &PixelClassifier,
    villages: &[MatchedVillage],
    cancel: &CancelToken,
) -> OverlayResult {
    let outcomes: Vec<Outcome> = villages.par_iter()
        .map(|village| {
            if cancel.is_cancelled() { return Outcome::Skipped }
            Outcome::Done(overlay_village(grid, classifier, village))
        })
        .collect();

    let mut result = OverlayResult::default();
    for (village, outcome) in villages.iter().zip(outcomes) {
        match outcome {
            Outcome::Done(Ok(overlay)) => {
                result.class_polygons.extend(overlay.class_polygons);
                result.land_stats.push(overlay.stats);
            }
            Outcome::Done(Err(OverlayFault::EmptyIntersection)) => {
                result.empty += 1;
                result.land_stats.push(VillageLandStats::empty(village.key.clone()));
            }
            Outcome::Done(Err(fault)) => {
                warn!("[overlay] {}: {fault}", village.key);
                result.faults.push(VillageFault { key: village.key.clone(), fault });
            }
            Outcome::Skipped => result.skipped.push(village.key.clone()),
        }
    }
    result.cancelled = !result.skipped.is_empty();

    if result.cancelled {
        warn!("[overlay] cancelled; {} of {} villages skipped", result.skipped.len(), villages.len());
    }
    info!(
        "[overlay] {} villages: {} class polygons, {} empty, {} faults",
        villages.len(), result.class_polygons.len(), result.empty, result.faults.len()
    );

    result
}
