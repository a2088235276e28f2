//! Link beneficiary villages, named in free text, to administrative boundary
//! polygons, then overlay a categorical land-cover raster per village.

pub mod atlas;
pub mod common;
pub mod config;
pub mod io;
pub mod matcher;
pub mod names;
pub mod output;
pub mod overlay;
pub mod types;

pub use atlas::Atlas;
pub use config::{AtlasConfig, ClaimPolicy, ScorerKind};
pub use matcher::{match_villages, BoundaryIndex, HierarchicalMatcher, MatchSet, MatchTier};
pub use names::NameNormalizer;
pub use output::{write_outputs, Manifest, OutputError, RunOutputs};
pub use overlay::{overlay_villages, CancelToken, OverlayFault, OverlayResult, PixelClassifier, StatsAggregator};
pub use types::*;
