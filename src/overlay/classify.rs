use std::collections::BTreeMap;

use landgrid::Clip;
use ndarray::Array2;

use crate::config::AtlasConfig;
use crate::types::LandType;

/// Maps raw raster codes to land-cover classes through a fixed table.
///
/// Codes missing from the table classify to `None` and are dropped from the
/// class polygons; they still count in the raw histogram.
#[derive(Debug, Clone)]
pub struct PixelClassifier {
    table: BTreeMap<i64, LandType>,
}

impl PixelClassifier {
    pub fn new(table: BTreeMap<i64, LandType>) -> Self { Self { table } }

    pub fn from_config(config: &AtlasConfig) -> Self { Self::new(config.class_table()) }

    #[inline]
    pub fn classify(&self, code: i64) -> Option<LandType> { self.table.get(&code).copied() }

    /// Class grid for a clipped window.
    pub fn classify_clip(&self, clip: &Clip) -> Array2<Option<LandType>> {
        clip.relabel(|code| self.classify(code))
    }

    #[inline] pub fn table(&self) -> &BTreeMap<i64, LandType> { &self.table }
}

impl Default for PixelClassifier {
    fn default() -> Self { Self::from_config(&AtlasConfig::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table() {
        let classifier = PixelClassifier::default();
        assert_eq!(classifier.classify(10), Some(LandType::TreeCover));
        assert_eq!(classifier.classify(40), Some(LandType::Cropland));
        assert_eq!(classifier.classify(50), Some(LandType::BuiltUp));
        assert_eq!(classifier.classify(80), Some(LandType::WaterBodies));
        assert_eq!(classifier.classify(20), None);
    }
}
