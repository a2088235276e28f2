use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::names::NameNormalizer;
use super::VillageKey;

/// One row of the beneficiary table, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeneficiaryRecord {
    pub district: String,
    pub block: String,
    pub village: String,
    /// `None` when the table has no count column or the cell is blank.
    pub count: Option<u64>,
}

impl BeneficiaryRecord {
    pub fn new(district: &str, block: &str, village: &str, count: Option<u64>) -> Self {
        Self { district: district.into(), block: block.into(), village: village.into(), count }
    }
}

/// Total beneficiaries for one normalized village key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeneficiaryAggregate {
    pub key: VillageKey,
    pub beneficiary_count: u64,
}

/// Normalize every record and sum counts per village key.
///
/// A record without a count contributes 1. The result is sorted by key and
/// holds exactly one aggregate per distinct key.
pub fn aggregate_beneficiaries<I>(records: I, normalizer: &NameNormalizer) -> Result<Vec<BeneficiaryAggregate>>
where
    I: IntoIterator<Item = BeneficiaryRecord>,
{
    let mut totals: BTreeMap<VillageKey, u64> = BTreeMap::new();
    for record in records {
        let key = normalizer.key(&record.district, &record.block, &record.village);
        let total = totals.entry(key).or_default();
        *total = total.checked_add(record.count.unwrap_or(1))
            .with_context(|| format!("[types::beneficiary] beneficiary count overflow for {}/{}/{}",
                record.district, record.block, record.village))?;
    }

    Ok(totals.into_iter()
        .map(|(key, beneficiary_count)| BeneficiaryAggregate { key, beneficiary_count })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_keys_are_summed_after_normalization() {
        let normalizer = NameNormalizer::default();
        let records = vec![
            BeneficiaryRecord::new("Anugul ", "Banarpal", "Kumurisingha", Some(3)),
            BeneficiaryRecord::new("angul", " banarpal", "KUMURISINGHA", None),
            BeneficiaryRecord::new("Angul", "Banarpal", "Balanda", Some(2)),
        ];
        let aggs = aggregate_beneficiaries(records, &normalizer).unwrap();
        assert_eq!(aggs, vec![
            BeneficiaryAggregate { key: VillageKey::new("angul", "banarpal", "balanda"), beneficiary_count: 2 },
            BeneficiaryAggregate { key: VillageKey::new("angul", "banarpal", "kumurisingha"), beneficiary_count: 4 },
        ]);
    }

    #[test]
    fn missing_count_defaults_to_one() {
        let normalizer = NameNormalizer::default();
        let records = vec![
            BeneficiaryRecord::new("puri", "gop", "a", None),
            BeneficiaryRecord::new("puri", "gop", "a", None),
        ];
        let aggs = aggregate_beneficiaries(records, &normalizer).unwrap();
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].beneficiary_count, 2);
    }

    #[test]
    fn overflow_is_an_error() {
        let normalizer = NameNormalizer::default();
        let records = vec![
            BeneficiaryRecord::new("puri", "gop", "a", Some(u64::MAX)),
            BeneficiaryRecord::new("puri", "gop", "a", Some(1)),
        ];
        assert!(aggregate_beneficiaries(records, &normalizer).is_err());
    }

    #[test]
    fn interior_whitespace_keeps_keys_apart() {
        let normalizer = NameNormalizer::default();
        let records = vec![
            BeneficiaryRecord::new("Puri", "Gop", "Kumur  Singha", Some(2)),
            BeneficiaryRecord::new("puri", "gop", " kumur singha ", Some(3)),
        ];
        let aggs = aggregate_beneficiaries(records, &normalizer).unwrap();
        assert_eq!(aggs, vec![
            BeneficiaryAggregate { key: VillageKey::new("puri", "gop", "kumur  singha"), beneficiary_count: 2 },
            BeneficiaryAggregate { key: VillageKey::new("puri", "gop", "kumur singha"), beneficiary_count: 3 },
        ]);
    }
}
