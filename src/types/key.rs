use std::fmt;

use serde::{Deserialize, Serialize};

/// The (district, block, village) triple that identifies a village.
///
/// Ordering is lexicographic by district, then block, then village, which is
/// the canonical order used everywhere results are sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct VillageKey {
    pub district: String,
    pub block: String,
    pub village: String,
}

impl VillageKey {
    pub fn new(district: impl Into<String>, block: impl Into<String>, village: impl Into<String>) -> Self {
        Self { district: district.into(), block: block.into(), village: village.into() }
    }

    /// Whether `other` lies in the same district and block.
    #[inline]
    pub fn same_block(&self, other: &Self) -> bool {
        self.district == other.district && self.block == other.block
    }

    /// Whether `other` lies in the same district.
    #[inline] pub fn same_district(&self, other: &Self) -> bool { self.district == other.district }
}

impl fmt::Display for VillageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.district, self.block, self.village)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_district_block_village() {
        let mut keys = vec![
            VillageKey::new("b", "a", "a"),
            VillageKey::new("a", "b", "a"),
            VillageKey::new("a", "a", "b"),
            VillageKey::new("a", "a", "a"),
        ];
        keys.sort();
        let flat: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(flat, vec!["a/a/a", "a/a/b", "a/b/a", "b/a/a"]);
    }

    #[test]
    fn scope_checks() {
        let a = VillageKey::new("angul", "banarpal", "x");
        assert!(a.same_block(&VillageKey::new("angul", "banarpal", "y")));
        assert!(!a.same_block(&VillageKey::new("angul", "talcher", "x")));
        assert!(a.same_district(&VillageKey::new("angul", "talcher", "x")));
    }
}
