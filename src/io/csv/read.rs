//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path};

use anyhow::{anyhow, bail, Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, DataType}};

use crate::{config::ColumnAliases, io::find_column, types::BeneficiaryRecord};

/// Read a CSV file with every column as a string.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Read CSV bytes with every column as a string.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .context("[io::csv::read] Failed to read CSV from bytes")
}

/// Read beneficiary records from a CSV file.
pub fn read_beneficiaries(path: &Path, columns: &ColumnAliases) -> Result<Vec<BeneficiaryRecord>> {
    let df = read_csv(path)?;
    beneficiaries_from_frame(&df, columns)
        .with_context(|| format!("[io::csv::read] Invalid beneficiary table {}", path.display()))
}

/// Extract beneficiary records from a string-typed frame.
///
/// District, block and village columns are required. The count column is
/// optional; a blank cell counts as absent.
pub fn beneficiaries_from_frame(df: &DataFrame, columns: &ColumnAliases) -> Result<Vec<BeneficiaryRecord>> {
    let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();

    let district = string_column(df, required(&names, &columns.district, "district")?)?;
    let block = string_column(df, required(&names, &columns.block, "block")?)?;
    let village = string_column(df, required(&names, &columns.village, "village")?)?;
    let counts = find_column(names.iter().copied(), &columns.beneficiaries)
        .map(|name| string_column(df, name))
        .transpose()?;

    (0..df.height())
        .map(|row| {
            let count = match &counts {
                Some(values) => parse_count(values[row].as_deref())
                    .with_context(|| format!("[io::csv::read] Row {}: bad beneficiary count", row + 1))?,
                None => None,
            };
            Ok(BeneficiaryRecord {
                district: district[row].clone().unwrap_or_default(),
                block: block[row].clone().unwrap_or_default(),
                village: village[row].clone().unwrap_or_default(),
                count,
            })
        })
        .collect()
}

fn required<'a>(names: &[&'a str], aliases: &[String], field: &str) -> Result<&'a str> {
    find_column(names.iter().copied(), aliases)
        .ok_or_else(|| anyhow!("[io::csv::read] Missing {field} column (tried {})", aliases.join(", ")))
}

/// All values of a column as optional owned strings.
fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Parse a count cell. Blank is `None`; integral floats such as `"3.0"` are accepted.
fn parse_count(cell: Option<&str>) -> Result<Option<u64>> {
    let Some(text) = cell.map(str::trim).filter(|t| !t.is_empty()) else { return Ok(None) };
    if let Ok(n) = text.parse::<u64>() { return Ok(Some(n)) }

    match text.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(Some(f as u64)),
        _ => bail!("not a non-negative integer: {text:?}"),
    }
}
