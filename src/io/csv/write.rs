//! CSV writing operations.

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::{CsvWriter, NamedFrom}, series::Series};

use crate::{
    matcher::MatchReportRow,
    overlay::VillageFault,
    types::{Unmatched, VillageKey, VillageLandStats},
};

/// Write a DataFrame to CSV bytes.
pub fn write_csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    CsvWriter::new(&mut out)
        .finish(df)
        .context("[io::csv::write] Failed to write CSV to bytes")?;
    Ok(out)
}

/// District, block and village columns for a list of keys.
fn key_columns<'a>(keys: impl Iterator<Item = &'a VillageKey>) -> [Series; 3] {
    let (mut districts, mut blocks, mut villages) = (Vec::new(), Vec::new(), Vec::new());
    for key in keys {
        districts.push(key.district.clone());
        blocks.push(key.block.clone());
        villages.push(key.village.clone());
    }
    [
        Series::new("district".into(), districts),
        Series::new("block".into(), blocks),
        Series::new("village".into(), villages),
    ]
}

fn frame(keys: [Series; 3], rest: Vec<Series>) -> Result<DataFrame> {
    let columns = keys.into_iter().chain(rest).map(Into::into).collect();
    DataFrame::new(columns).context("[io::csv::write] Failed to assemble table")
}

/// `village_land_stats.csv`: one row per village, histogram as a JSON string.
pub fn land_stats_csv(stats: &[VillageLandStats]) -> Result<Vec<u8>> {
    let land_stats: Vec<String> = stats.iter().map(VillageLandStats::land_stats_json).collect();
    let totals: Vec<u64> = stats.iter().map(|s| s.total_pixels).collect();
    let mut df = frame(key_columns(stats.iter().map(|s| &s.key)), vec![
        Series::new("land_stats".into(), land_stats),
        Series::new("total_pixels".into(), totals),
    ])?;
    write_csv_bytes(&mut df)
}

/// `unmatched.csv`: audit list of aggregates left out of the matched set.
pub fn unmatched_csv(unmatched: &[Unmatched]) -> Result<Vec<u8>> {
    let reasons: Vec<String> = unmatched.iter().map(|u| u.reason.to_string()).collect();
    let mut df = frame(key_columns(unmatched.iter().map(|u| &u.key)), vec![
        Series::new("reason".into(), reasons),
    ])?;
    write_csv_bytes(&mut df)
}

/// `match_report.csv`: status, tier and score for every aggregate.
pub fn match_report_csv(report: &[MatchReportRow]) -> Result<Vec<u8>> {
    let counts: Vec<u64> = report.iter().map(|r| r.beneficiary_count).collect();
    let status: Vec<&str> = report.iter().map(|r| r.status.as_str()).collect();
    let tier: Vec<Option<&str>> = report.iter().map(|r| r.tier.map(|t| t.as_str())).collect();
    let score: Vec<Option<String>> = report.iter().map(|r| r.score.map(|s| format!("{s:.2}"))).collect();
    let boundary = |f: fn(&VillageKey) -> &str| -> Vec<Option<String>> {
        report.iter().map(|r| r.boundary.as_ref().map(|k| f(k).to_string())).collect()
    };

    let mut df = frame(key_columns(report.iter().map(|r| &r.key)), vec![
        Series::new("num_beneficiaries".into(), counts),
        Series::new("status".into(), status),
        Series::new("tier".into(), tier),
        Series::new("score".into(), score),
        Series::new("boundary_district".into(), boundary(|k| &k.district)),
        Series::new("boundary_block".into(), boundary(|k| &k.block)),
        Series::new("boundary_village".into(), boundary(|k| &k.village)),
    ])?;
    write_csv_bytes(&mut df)
}

/// `overlay_faults.csv`: villages whose overlay failed or never ran.
pub fn overlay_faults_csv(faults: &[VillageFault], skipped: &[VillageKey]) -> Result<Vec<u8>> {
    let keys = faults.iter().map(|f| &f.key).chain(skipped);
    let messages: Vec<String> = faults.iter()
        .map(|f| f.fault.to_string())
        .chain(skipped.iter().map(|_| "skipped: run cancelled".to_string()))
        .collect();
    let mut df = frame(key_columns(keys), vec![Series::new("fault".into(), messages)])?;
    write_csv_bytes(&mut df)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::types::UnmatchedReason;

    #[test]
    fn land_stats_rows() {
        let stats = vec![
            VillageLandStats::new(VillageKey::new("angul", "banarpal", "x"), BTreeMap::from([(10, 2), (95, 1)])),
            VillageLandStats::empty(VillageKey::new("angul", "banarpal", "y")),
        ];
        let text = String::from_utf8(land_stats_csv(&stats).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "district,block,village,land_stats,total_pixels");
        assert_eq!(lines[1], r#"angul,banarpal,x,"{""10"":2,""95"":1}",3"#);
        assert_eq!(lines[2], "angul,banarpal,y,{},0");
    }

    #[test]
    fn unmatched_rows_carry_reason() {
        let rows = vec![Unmatched {
            key: VillageKey::new("puri", "gop", "kona"),
            reason: UnmatchedReason::PolygonClaimed { by: VillageKey::new("puri", "gop", "konaa") },
        }];
        let text = String::from_utf8(unmatched_csv(&rows).unwrap()).unwrap();
        assert_eq!(text.lines().nth(1), Some("puri,gop,kona,polygon_claimed:puri/gop/konaa"));
    }
}
