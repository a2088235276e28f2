//! Run configuration, loaded once at start-up and passed explicitly.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::LandType;

/// Which string-similarity function the fuzzy tiers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// Composite of indel, token and partial ratios.
    #[default]
    Weighted,
    /// Plain normalized indel similarity.
    Ratio,
    Levenshtein,
    JaroWinkler,
}

/// What happens when a second village resolves to an already-claimed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPolicy {
    /// First claimant (in key order) keeps the polygon; later ones are unmatched.
    #[default]
    Exclusive,
    /// Every claimant gets its own row carrying a copy of the geometry.
    Shared,
}

/// One raster code → land-cover class rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRule {
    pub code: i64,
    pub land_type: LandType,
}

/// Attribute names accepted for each field, matched case-insensitively in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub district: Vec<String>,
    pub block: Vec<String>,
    pub village: Vec<String>,
    pub beneficiaries: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let names = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        Self {
            district: names(&["district", "district_n"]),
            block: names(&["block", "block_name"]),
            village: names(&["village", "census_vil"]),
            beneficiaries: names(&["num_beneficiaries"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AtlasConfig {
    /// State attached to every boundary polygon.
    pub state_name: String,
    /// Minimum fuzzy score, in `[0, 100]`, for a fuzzy tier to accept a candidate.
    pub threshold: f64,
    pub scorer: ScorerKind,
    pub claim_policy: ClaimPolicy,
    pub district_corrections: BTreeMap<String, String>,
    pub block_corrections: BTreeMap<String, String>,
    pub village_corrections: BTreeMap<String, String>,
    pub classes: Vec<ClassRule>,
    pub columns: ColumnAliases,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        let corrections = |pairs: &[(&str, &str)]| {
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
        };
        Self {
            state_name: "Odisha".into(),
            threshold: 85.0,
            scorer: ScorerKind::default(),
            claim_policy: ClaimPolicy::default(),
            district_corrections: corrections(&[
                ("anugul", "angul"),
                ("balasore", "baleswar"),
                ("baleshwar", "baleswar"),
            ]),
            block_corrections: BTreeMap::new(),
            village_corrections: BTreeMap::new(),
            classes: vec![
                ClassRule { code: 10, land_type: LandType::TreeCover },
                ClassRule { code: 40, land_type: LandType::Cropland },
                ClassRule { code: 50, land_type: LandType::BuiltUp },
                ClassRule { code: 80, land_type: LandType::WaterBodies },
            ],
            columns: ColumnAliases::default(),
        }
    }
}

impl AtlasConfig {
    /// Parse a TOML document; absent fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("[config] Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read configuration file: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("[config] Invalid configuration in {}", path.display()))
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!((0.0..=100.0).contains(&self.threshold),
            "[config] threshold must be within [0, 100], got {}", self.threshold);

        let mut seen = BTreeMap::new();
        for rule in &self.classes {
            if let Some(previous) = seen.insert(rule.code, rule.land_type) {
                bail!("[config] raster code {} is mapped twice ({} and {})", rule.code, previous, rule.land_type);
            }
        }

        for (field, aliases) in [
            ("district", &self.columns.district),
            ("block", &self.columns.block),
            ("village", &self.columns.village),
        ] {
            ensure!(!aliases.is_empty(), "[config] columns.{field} needs at least one alias");
        }
        Ok(())
    }

    /// The class rules as a lookup table.
    pub fn class_table(&self) -> BTreeMap<i64, LandType> {
        self.classes.iter().map(|rule| (rule.code, rule.land_type)).collect()
    }
}
