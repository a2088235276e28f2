use std::{fs, path::Path};

use ndarray::Array2;

use crate::{affine::Affine, error::GridError, grid::Grid};

/// Read an ESRI ASCII grid (`.asc`) from disk.
pub fn read_ascii_file(path: &Path) -> Result<Grid, GridError> {
    let text = fs::read_to_string(path)
        .map_err(|source| GridError::Io { path: path.to_path_buf(), source })?;
    read_ascii_str(&text)
}

/// Parse an ESRI ASCII grid.
///
/// The header carries `ncols`, `nrows`, `xllcorner`/`xllcenter`,
/// `yllcorner`/`yllcenter`, `cellsize` and an optional `NODATA_value`, in any
/// order and case. Cell values follow in row-major order, top row first.
pub fn read_ascii_str(text: &str) -> Result<Grid, GridError> {
    let mut tokens = text.split_whitespace().peekable();

    let mut ncols = None;
    let mut nrows = None;
    let mut xll = None;
    let mut yll = None;
    let mut centered = false;
    let mut cellsize = None;
    let mut nodata = None;

    while let Some(&key) = tokens.peek() {
        if !key.starts_with(|c: char| c.is_ascii_alphabetic()) { break }
        tokens.next();
        let value = tokens.next()
            .ok_or_else(|| GridError::Invalid(format!("header key {key} has no value")))?;
        let number = || value.parse::<f64>()
            .map_err(|_| GridError::Invalid(format!("header {key} is not numeric: {value}")));

        match key.to_ascii_lowercase().as_str() {
            "ncols" => ncols = Some(dimension(key, value)?),
            "nrows" => nrows = Some(dimension(key, value)?),
            "xllcorner" => xll = Some(number()?),
            "yllcorner" => yll = Some(number()?),
            "xllcenter" => { xll = Some(number()?); centered = true }
            "yllcenter" => { yll = Some(number()?); centered = true }
            "cellsize" => cellsize = Some(number()?),
            "nodata_value" => nodata = super::parse_nodata(value),
            other => return Err(GridError::Invalid(format!("unknown header key {other}"))),
        }
    }

    let missing = |name: &str| GridError::Invalid(format!("header is missing {name}"));
    let cols = ncols.ok_or_else(|| missing("ncols"))?;
    let rows = nrows.ok_or_else(|| missing("nrows"))?;
    let (mut x0, mut y0) = (xll.ok_or_else(|| missing("xll"))?, yll.ok_or_else(|| missing("yll"))?);
    let size = cellsize.ok_or_else(|| missing("cellsize"))?;
    if centered {
        x0 -= size / 2.0;
        y0 -= size / 2.0;
    }

    let values = tokens
        .map(|t| {
            t.parse::<i64>().or_else(|_| match t.parse::<f64>() {
                Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
                _ => Err(GridError::Invalid(format!("cell value is not an integer: {t}"))),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let expected = rows.checked_mul(cols)
        .ok_or_else(|| GridError::Invalid(format!("grid of {rows}x{cols} cells is too large")))?;
    if values.len() != expected {
        return Err(GridError::Invalid(format!(
            "found {} cell values, expected {rows}x{cols}", values.len()
        )));
    }

    let data = Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| GridError::Invalid(e.to_string()))?;
    let transform = Affine::north_up(x0, y0 + rows as f64 * size, size, size);
    Ok(Grid::new(data, transform, nodata))
}

/// A row or column count: a non-negative whole number, optionally written as `"12.0"`.
fn dimension(key: &str, value: &str) -> Result<usize, GridError> {
    if let Ok(n) = value.parse::<usize>() { return Ok(n) }
    match value.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= usize::MAX as f64 => Ok(v as usize),
        _ => Err(GridError::Invalid(format!("header {key} is not a cell count: {value}"))),
    }
}
