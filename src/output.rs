//! Writing a run's datasets and manifest into an output directory.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    common,
    io::{csv, geojson},
    matcher::MatchSet,
    overlay::OverlayResult,
    types::MatchedVillage,
};

pub const MATCHED_VILLAGES: &str = "matched_villages.geojson";
pub const UNMATCHED: &str = "unmatched.csv";
pub const MATCH_REPORT: &str = "match_report.csv";
pub const CLASS_POLYGONS: &str = "class_polygons.geojson";
pub const VILLAGE_LAND_STATS: &str = "village_land_stats.csv";
pub const VILLAGE_LANDUSE: &str = "village_landuse.geojson";
pub const OVERLAY_FAULTS: &str = "overlay_faults.csv";
pub const MANIFEST: &str = "manifest.json";

/// A result dataset could not be persisted. Fatal for the run.
#[derive(Debug, Error)]
#[error("failed to write output {output}")]
pub struct OutputError {
    pub output: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl OutputError {
    fn new(output: &str, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self { output: output.to_string(), source: source.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHash {
    pub sha256: String,
}

/// Summary of one run's outputs, written as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Manifest {
    pub version: String,
    pub counts: BTreeMap<String, usize>,
    pub files: BTreeMap<String, FileHash>,
    /// Set when the overlay stopped early; the datasets hold completed villages only.
    pub cancelled: bool,
}

/// Datasets produced by a run. Either stage may be absent.
#[derive(Debug, Clone, Copy)]
pub struct RunOutputs<'a> {
    pub matches: Option<&'a MatchSet>,
    /// Villages the overlay ran on, used for the land-use layer.
    pub villages: &'a [MatchedVillage],
    pub overlay: Option<&'a OverlayResult>,
}

/// Serialize every dataset into `dir`, then the manifest.
///
/// Stops at the first failing output. The in-memory results are borrowed, so
/// the caller still holds them after an error.
pub fn write_outputs(dir: &Path, outputs: RunOutputs<'_>) -> Result<Manifest, OutputError> {
    common::ensure_dir_exists(dir).map_err(|e| OutputError::new(&dir.display().to_string(), e))?;

    let mut manifest = Manifest { version: env!("CARGO_PKG_VERSION").to_string(), ..Default::default() };
    let mut emit = |name: &str, count: usize, bytes: anyhow::Result<Vec<u8>>| -> Result<(), OutputError> {
        let bytes = bytes.map_err(|e| OutputError::new(name, e))?;
        fs::write(dir.join(name), &bytes).map_err(|e| OutputError::new(name, e))?;
        manifest.counts.insert(name.to_string(), count);
        manifest.files.insert(name.to_string(), FileHash { sha256: common::sha256_bytes(&bytes) });
        Ok(())
    };

    if let Some(matches) = outputs.matches {
        emit(MATCHED_VILLAGES, matches.matched.len(), geojson::matched_villages_geojson(&matches.matched))?;
        emit(UNMATCHED, matches.unmatched.len(), csv::unmatched_csv(&matches.unmatched))?;
        emit(MATCH_REPORT, matches.report.len(), csv::match_report_csv(&matches.report))?;
    }

    if let Some(overlay) = outputs.overlay {
        emit(CLASS_POLYGONS, overlay.class_polygons.len(), geojson::class_polygons_geojson(&overlay.class_polygons))?;
        emit(VILLAGE_LAND_STATS, overlay.land_stats.len(), csv::land_stats_csv(&overlay.land_stats))?;
        emit(VILLAGE_LANDUSE, overlay.land_stats.len(),
            geojson::village_landuse_geojson(outputs.villages, &overlay.land_stats))?;
        emit(OVERLAY_FAULTS, overlay.faults.len() + overlay.skipped.len(),
            csv::overlay_faults_csv(&overlay.faults, &overlay.skipped))?;
        manifest.cancelled = overlay.cancelled;
    }

    let bytes = serde_json::to_vec_pretty(&manifest).map_err(|e| OutputError::new(MANIFEST, e))?;
    fs::write(dir.join(MANIFEST), bytes).map_err(|e| OutputError::new(MANIFEST, e))?;

    info!("[output] Wrote {} datasets to {}", manifest.files.len(), dir.display());
    Ok(manifest)
}
