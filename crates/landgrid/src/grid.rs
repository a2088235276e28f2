use std::path::Path;

use geo::Rect;
use ndarray::{s, Array2, ArrayView2};

use crate::{affine::Affine, error::GridError};

/// A single-band categorical raster held in memory.
#[derive(Debug, Clone)]
pub struct Grid {
    data: Array2<i64>,
    transform: Affine,
    nodata: Option<i64>,
}

/// A rectangular block of cells, in pixel offsets from the grid origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub row_off: usize,
    pub col_off: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Window {
    #[inline] pub fn is_empty(&self) -> bool { self.rows == 0 || self.cols == 0 }

    #[inline] pub fn len(&self) -> usize { self.rows * self.cols }
}

impl Grid {
    /// Construct a grid from a row-major cell array.
    pub fn new(data: Array2<i64>, transform: Affine, nodata: Option<i64>) -> Self {
        Self { data, transform, nodata }
    }

    /// Open a raster file, choosing the reader by extension (`.tif`, `.tiff`, `.asc`).
    pub fn open(path: &Path) -> Result<Self, GridError> {
        let ext = path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "tif" | "tiff" => crate::io::tiff::read_tiff_file(path),
            "asc" => crate::io::ascii::read_ascii_file(path),
            other => Err(GridError::UnsupportedFormat(format!("{} ({})", other, path.display()))),
        }
    }

    #[inline] pub fn rows(&self) -> usize { self.data.nrows() }

    #[inline] pub fn cols(&self) -> usize { self.data.ncols() }

    #[inline] pub fn transform(&self) -> &Affine { &self.transform }

    #[inline] pub fn nodata(&self) -> Option<i64> { self.nodata }

    #[inline] pub fn data(&self) -> ArrayView2<'_, i64> { self.data.view() }

    /// Cell value, or `None` when out of range or equal to the nodata sentinel.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        self.data.get((row, col)).copied().filter(|&v| Some(v) != self.nodata)
    }

    /// Minimal window of whole cells covering a world-space rectangle, clamped
    /// to the grid. The result is empty when the rectangle misses the grid.
    pub fn window_for(&self, rect: &Rect<f64>) -> Result<Window, GridError> {
        let inverse = self.transform.inverse().ok_or(GridError::SingularTransform)?;

        let (min, max) = (rect.min(), rect.max());
        let corners = [
            inverse.apply(min.x, min.y),
            inverse.apply(max.x, min.y),
            inverse.apply(min.x, max.y),
            inverse.apply(max.x, max.y),
        ];
        let col_lo = corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min).floor();
        let col_hi = corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max).ceil();
        let row_lo = corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min).floor();
        let row_hi = corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max).ceil();

        let clamp = |v: f64, hi: usize| v.max(0.0).min(hi as f64) as usize;
        let (c0, c1) = (clamp(col_lo, self.cols()), clamp(col_hi, self.cols()));
        let (r0, r1) = (clamp(row_lo, self.rows()), clamp(row_hi, self.rows()));

        Ok(Window {
            row_off: r0,
            col_off: c0,
            rows: r1.saturating_sub(r0),
            cols: c1.saturating_sub(c0),
        })
    }

    /// Read a window of raw cell values (nodata left in place).
    pub fn read_window(&self, window: &Window) -> ArrayView2<'_, i64> {
        self.data.slice(s![
            window.row_off .. window.row_off + window.rows,
            window.col_off .. window.col_off + window.cols
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> Grid {
        Grid::new(
            array![
                [1, 2, 3, 4],
                [5, 6, 7, 8],
                [9, 0, 0, 9],
            ],
            Affine::north_up(0.0, 3.0, 1.0, 1.0),
            Some(0),
        )
    }

    #[test]
    fn get_masks_nodata_and_out_of_range() {
        let grid = sample();
        assert_eq!(grid.get(0, 0), Some(1));
        assert_eq!(grid.get(2, 1), None);
        assert_eq!(grid.get(3, 0), None);
    }

    #[test]
    fn window_snaps_outward_to_whole_cells() {
        let grid = sample();
        let w = grid.window_for(&Rect::new((0.5, 0.5), (2.5, 1.5))).unwrap();
        assert_eq!(w, Window { row_off: 1, col_off: 0, rows: 2, cols: 3 });
        assert_eq!(grid.read_window(&w), array![[5, 6, 7], [9, 0, 0]]);
    }

    #[test]
    fn window_is_clamped_to_grid() {
        let w = sample().window_for(&Rect::new((-5.0, -5.0), (1.0, 10.0))).unwrap();
        assert_eq!(w, Window { row_off: 0, col_off: 0, rows: 3, cols: 1 });
    }

    #[test]
    fn disjoint_rect_gives_empty_window() {
        let w = sample().window_for(&Rect::new((10.0, 10.0), (12.0, 12.0))).unwrap();
        assert!(w.is_empty());
    }

    #[test]
    fn singular_transform_is_reported() {
        let grid = Grid::new(array![[1]], Affine::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0), None);
        assert!(matches!(
            grid.window_for(&Rect::new((0.0, 0.0), (1.0, 1.0))),
            Err(GridError::SingularTransform)
        ));
    }
}
