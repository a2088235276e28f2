//! Raster readers. Each reader produces a fully materialized [`Grid`](crate::Grid).

pub mod ascii;
pub mod tiff;

pub use ascii::{read_ascii_file, read_ascii_str};
pub use self::tiff::{read_tiff, read_tiff_file};

/// Parse a nodata sentinel written as text. Non-integral and NaN sentinels
/// cannot occur in an integer band and are treated as "no sentinel".
pub(crate) fn parse_nodata(text: &str) -> Option<i64> {
    let text = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if let Ok(v) = text.parse::<i64>() { return Some(v) }
    let v = text.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}
