//! End-to-end pipeline: load, match, overlay.

use std::path::Path;

use anyhow::{Context, Result};
use landgrid::Grid;
use tracing::info;

use crate::{
    config::AtlasConfig,
    io::{self, csv},
    matcher::{self, BoundaryIndex, MatchSet},
    names::NameNormalizer,
    overlay::{self, CancelToken, OverlayResult, PixelClassifier},
    types::{aggregate_beneficiaries, BeneficiaryRecord, BoundaryPolygon, MatchedVillage},
};

/// A configured pipeline. Holds the immutable lookup tables built from the
/// configuration; all inputs are passed per call.
#[derive(Debug, Clone)]
pub struct Atlas {
    config: AtlasConfig,
    normalizer: NameNormalizer,
    classifier: PixelClassifier,
}

impl Atlas {
    pub fn new(config: AtlasConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: NameNormalizer::from_config(&config),
            classifier: PixelClassifier::from_config(&config),
            config,
        })
    }

    #[inline] pub fn config(&self) -> &AtlasConfig { &self.config }

    #[inline] pub fn normalizer(&self) -> &NameNormalizer { &self.normalizer }

    #[inline] pub fn classifier(&self) -> &PixelClassifier { &self.classifier }

    /// Load and normalize boundary polygons.
    pub fn load_boundaries(&self, path: &Path) -> Result<Vec<BoundaryPolygon>> {
        io::load_boundaries(path, &self.config.columns, &self.normalizer, &self.config.state_name)
    }

    /// Load raw beneficiary records.
    pub fn load_beneficiaries(&self, path: &Path) -> Result<Vec<BeneficiaryRecord>> {
        csv::read_beneficiaries(path, &self.config.columns)
    }

    /// Aggregate `records` and match every aggregate against `boundaries`.
    pub fn match_records(&self, boundaries: Vec<BoundaryPolygon>, records: Vec<BeneficiaryRecord>) -> Result<MatchSet> {
        let aggregates = aggregate_beneficiaries(records, &self.normalizer)?;
        info!("[atlas] Matching {} villages against {} polygons", aggregates.len(), boundaries.len());

        let index = BoundaryIndex::new(boundaries);
        let scorer = self.config.scorer.build();
        Ok(matcher::match_villages(
            &index,
            aggregates,
            scorer.as_ref(),
            self.config.threshold,
            self.config.claim_policy,
            &self.config.state_name,
        ))
    }

    /// Load both inputs and match them.
    pub fn match_files(&self, boundaries: &Path, beneficiaries: &Path) -> Result<MatchSet> {
        let polygons = self.load_boundaries(boundaries)?;
        let records = self.load_beneficiaries(beneficiaries)?;
        self.match_records(polygons, records)
    }

    /// Overlay matched villages on an in-memory raster.
    pub fn overlay(&self, grid: &Grid, villages: &[MatchedVillage], cancel: &CancelToken) -> OverlayResult {
        overlay::overlay_villages(grid, &self.classifier, villages, cancel)
    }

    /// Load a raster once and overlay matched villages on it.
    pub fn overlay_file(&self, raster: &Path, villages: &[MatchedVillage], cancel: &CancelToken) -> Result<OverlayResult> {
        let grid = Grid::open(raster)
            .with_context(|| format!("[atlas] Failed to load raster {}", raster.display()))?;
        info!("[atlas] Raster {} is {}x{} cells", raster.display(), grid.cols(), grid.rows());
        Ok(self.overlay(&grid, villages, cancel))
    }
}
