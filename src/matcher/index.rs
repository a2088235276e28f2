use ahash::AHashMap;
use smallvec::SmallVec;

use crate::types::{BoundaryPolygon, VillageKey};

/// Boundary polygons in canonical order, with lookups for each matcher tier.
///
/// Canonical order is (district, block, village, source index) of the
/// normalized names. Every candidate list below is a subsequence of that
/// order, which makes tie-breaking independent of input file order.
#[derive(Debug)]
pub struct BoundaryIndex {
    polygons: Vec<BoundaryPolygon>,
    all: Vec<usize>,
    exact: AHashMap<VillageKey, SmallVec<[usize; 1]>>,
    by_block: AHashMap<(String, String), Vec<usize>>,
    by_district: AHashMap<String, Vec<usize>>,
}

impl BoundaryIndex {
    pub fn new(mut polygons: Vec<BoundaryPolygon>) -> Self {
        polygons.sort_by(|a, b| a.key.cmp(&b.key).then(a.source_index.cmp(&b.source_index)));

        let mut exact: AHashMap<VillageKey, SmallVec<[usize; 1]>> = AHashMap::new();
        let mut by_block: AHashMap<(String, String), Vec<usize>> = AHashMap::new();
        let mut by_district: AHashMap<String, Vec<usize>> = AHashMap::new();

        for (i, polygon) in polygons.iter().enumerate() {
            let key = &polygon.key;
            exact.entry(key.clone()).or_default().push(i);
            by_block.entry((key.district.clone(), key.block.clone())).or_default().push(i);
            by_district.entry(key.district.clone()).or_default().push(i);
        }

        Self { all: (0..polygons.len()).collect(), polygons, exact, by_block, by_district }
    }

    #[inline] pub fn len(&self) -> usize { self.polygons.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.polygons.is_empty() }

    /// Polygon at a canonical position.
    #[inline] pub fn get(&self, idx: usize) -> &BoundaryPolygon { &self.polygons[idx] }

    #[inline] pub fn polygons(&self) -> &[BoundaryPolygon] { &self.polygons }

    /// Polygons whose normalized key equals `key` exactly.
    pub fn exact(&self, key: &VillageKey) -> &[usize] {
        self.exact.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Polygons sharing `key`'s district and block.
    pub fn in_block(&self, key: &VillageKey) -> &[usize] {
        // The tuple key forces owned strings for the lookup.
        self.by_block.get(&(key.district.clone(), key.block.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Polygons sharing `key`'s district.
    pub fn in_district(&self, key: &VillageKey) -> &[usize] {
        self.by_district.get(&key.district).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every polygon.
    #[inline] pub fn all(&self) -> &[usize] { &self.all }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;

    fn polygon(source_index: usize, d: &str, b: &str, v: &str) -> BoundaryPolygon {
        let key = VillageKey::new(d, b, v);
        BoundaryPolygon {
            source_index,
            state: "Odisha".into(),
            raw: key.clone(),
            key,
            geometry: MultiPolygon(vec![]),
        }
    }

    fn sample() -> BoundaryIndex {
        BoundaryIndex::new(vec![
            polygon(0, "puri", "gop", "b"),
            polygon(1, "angul", "talcher", "x"),
            polygon(2, "angul", "banarpal", "y"),
            polygon(3, "angul", "banarpal", "x"),
            polygon(4, "angul", "banarpal", "x"),
        ])
    }

    #[test]
    fn canonical_order_is_key_then_source_index() {
        let index = sample();
        let order: Vec<usize> = index.polygons().iter().map(|p| p.source_index).collect();
        assert_eq!(order, vec![3, 4, 2, 1, 0]);
    }

    #[test]
    fn scoped_lookups() {
        let index = sample();
        let key = VillageKey::new("angul", "banarpal", "x");
        assert_eq!(index.exact(&key), &[0, 1]);
        assert_eq!(index.in_block(&key), &[0, 1, 2]);
        assert_eq!(index.in_district(&key), &[0, 1, 2, 3]);
        assert_eq!(index.all().len(), 5);
    }

    #[test]
    fn missing_scopes_are_empty() {
        let index = sample();
        let key = VillageKey::new("khurda", "x", "y");
        assert!(index.exact(&key).is_empty());
        assert!(index.in_block(&key).is_empty());
        assert!(index.in_district(&key).is_empty());
    }
}
