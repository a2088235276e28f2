//! Canonicalization of free-text administrative names.

use std::collections::BTreeMap;

use crate::{config::AtlasConfig, types::VillageKey};

/// Canonicalizes district/block/village names before any comparison.
///
/// Every name is trimmed and lowercased; then the field's correction table
/// maps known alias spellings to a canonical one. Interior whitespace is kept
/// as is, so `"kumur  singha"` and `"kumur singha"` stay distinct names. The
/// same normalizer is applied to the boundary and beneficiary datasets.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    districts: BTreeMap<String, String>,
    blocks: BTreeMap<String, String>,
    villages: BTreeMap<String, String>,
}

impl NameNormalizer {
    /// Build from correction tables. Table keys are normalized the same way as
    /// input names, so `"Anugul"` and `"anugul"` are the same entry.
    pub fn new(
        districts: &BTreeMap<String, String>,
        blocks: &BTreeMap<String, String>,
        villages: &BTreeMap<String, String>,
    ) -> Self {
        let canon = |table: &BTreeMap<String, String>| -> BTreeMap<String, String> {
            table.iter().map(|(from, to)| (clean(from), clean(to))).collect()
        };
        Self { districts: canon(districts), blocks: canon(blocks), villages: canon(villages) }
    }

    pub fn from_config(config: &AtlasConfig) -> Self {
        Self::new(&config.district_corrections, &config.block_corrections, &config.village_corrections)
    }

    /// Trim and lowercase, without corrections.
    pub fn clean(&self, name: &str) -> String { clean(name) }

    pub fn district(&self, name: &str) -> String { correct(&self.districts, self.clean(name)) }

    pub fn block(&self, name: &str) -> String { correct(&self.blocks, self.clean(name)) }

    pub fn village(&self, name: &str) -> String { correct(&self.villages, self.clean(name)) }

    /// Normalize a full village key.
    pub fn key(&self, district: &str, block: &str, village: &str) -> VillageKey {
        VillageKey {
            district: self.district(district),
            block: self.block(block),
            village: self.village(village),
        }
    }
}

impl Default for NameNormalizer {
    fn default() -> Self { Self::from_config(&AtlasConfig::default()) }
}

fn clean(name: &str) -> String { name.trim().to_lowercase() }

fn correct(table: &BTreeMap<String, String>, name: String) -> String {
    table.get(&name).cloned().unwrap_or(name)
}
