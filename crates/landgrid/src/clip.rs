use geo::{BoundingRect, Coord, MultiPolygon};
use ndarray::Array2;

use crate::{affine::Affine, error::GridError, grid::{Grid, Window}};

/// Cells of a grid that fall inside one polygon.
///
/// `cells` covers `window`; a cell is `None` when its centre lies outside the
/// polygon or when it holds the nodata sentinel.
#[derive(Debug, Clone)]
pub struct Clip {
    pub window: Window,
    pub transform: Affine,
    pub cells: Array2<Option<i64>>,
}

impl Clip {
    /// Iterate the values of every valid cell, row-major.
    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.cells.iter().filter_map(|v| *v)
    }

    /// Number of valid cells.
    pub fn count(&self) -> usize { self.values().count() }

    /// Relabel every valid cell, dropping cells the mapping rejects.
    pub fn relabel<T, F>(&self, f: F) -> Array2<Option<T>>
    where
        F: Fn(i64) -> Option<T>,
    {
        self.cells.map(|v| v.and_then(&f))
    }
}

impl Grid {
    /// Clip the grid to a polygon.
    ///
    /// Returns `Ok(None)` when the polygon misses the grid or every covered
    /// cell is nodata. A cell is covered when its centre lies inside the
    /// polygon under the even-odd rule, so holes are excluded.
    pub fn clip(&self, shape: &MultiPolygon<f64>) -> Result<Option<Clip>, GridError> {
        validate(shape)?;
        let rect = shape.bounding_rect()
            .ok_or_else(|| GridError::InvalidGeometry("geometry has no extent".into()))?;

        let window = self.window_for(&rect)?;
        if window.is_empty() { return Ok(None) }

        let inverse = self.transform().inverse().ok_or(GridError::SingularTransform)?;
        let edges = pixel_edges(shape, &inverse, &window);
        let raw = self.read_window(&window);
        let nodata = self.nodata();

        let mut cells = Array2::from_elem((window.rows, window.cols), None);
        let mut crossings = Vec::new();
        let mut any = false;

        for row in 0..window.rows {
            let yc = row as f64 + 0.5;
            crossings.clear();
            for (p, q) in &edges {
                if (p.y > yc) != (q.y > yc) {
                    crossings.push(p.x + (yc - p.y) * (q.x - p.x) / (q.y - p.y));
                }
            }
            crossings.sort_by(f64::total_cmp);

            for span in crossings.chunks_exact(2) {
                let start = first_centre_at_or_after(span[0], window.cols);
                let end = first_centre_at_or_after(span[1], window.cols);
                for col in start..end {
                    let value = raw[(row, col)];
                    if Some(value) != nodata {
                        cells[(row, col)] = Some(value);
                        any = true;
                    }
                }
            }
        }

        if !any { return Ok(None) }

        Ok(Some(Clip {
            window,
            transform: self.transform().shifted(window.col_off, window.row_off),
            cells,
        }))
    }
}

/// Index of the first column whose centre `c + 0.5` is `>= x`, clamped to `[0, cols]`.
#[inline]
fn first_centre_at_or_after(x: f64, cols: usize) -> usize {
    (x - 0.5).ceil().max(0.0).min(cols as f64) as usize
}

fn validate(shape: &MultiPolygon<f64>) -> Result<(), GridError> {
    if shape.0.is_empty() {
        return Err(GridError::InvalidGeometry("geometry has no polygons".into()));
    }
    let finite = shape.0.iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .flat_map(|ring| ring.coords())
        .all(|c| c.x.is_finite() && c.y.is_finite());
    if !finite {
        return Err(GridError::InvalidGeometry("geometry has non-finite coordinates".into()));
    }
    Ok(())
}

/// All ring edges mapped into pixel space relative to the window origin.
fn pixel_edges(shape: &MultiPolygon<f64>, inverse: &Affine, window: &Window) -> Vec<(Coord<f64>, Coord<f64>)> {
    let to_pixel = |c: Coord<f64>| {
        let p = inverse.apply(c.x, c.y);
        Coord { x: p.x - window.col_off as f64, y: p.y - window.row_off as f64 }
    };

    shape.0.iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .flat_map(|ring| ring.lines())
        .map(|line| (to_pixel(line.start), to_pixel(line.end)))
        .filter(|(p, q)| p.y != q.y)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use ndarray::array;

    fn grid() -> Grid {
        Grid::new(
            array![
                [10, 10, 40, 40],
                [10, 99, 40, 40],
                [50, 50, 80,  0],
                [50, 50, 80,  0],
            ],
            Affine::north_up(0.0, 4.0, 1.0, 1.0),
            Some(0),
        )
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]])
    }

    #[test]
    fn clip_keeps_cells_with_centres_inside() {
        let clip = grid().clip(&square(0.0, 2.0, 2.0, 4.0)).unwrap().unwrap();
        assert_eq!(clip.window, Window { row_off: 0, col_off: 0, rows: 2, cols: 2 });
        assert_eq!(clip.cells, array![[Some(10), Some(10)], [Some(10), Some(99)]]);
    }

    #[test]
    fn clip_excludes_nodata() {
        let clip = grid().clip(&square(2.0, 0.0, 4.0, 2.0)).unwrap().unwrap();
        assert_eq!(clip.values().collect::<Vec<_>>(), vec![80, 80]);
        assert_eq!(clip.count(), 2);
    }

    #[test]
    fn clip_transform_points_at_window_origin() {
        let clip = grid().clip(&square(2.0, 0.0, 4.0, 2.0)).unwrap().unwrap();
        assert_eq!(clip.transform.apply(0.0, 0.0), Coord { x: 2.0, y: 2.0 });
    }

    #[test]
    fn triangle_masks_cells_outside() {
        // Lower-left triangle of the top-left 2x2 block; only centres below the diagonal.
        let tri = MultiPolygon(vec![polygon![(x: 0.0, y: 2.0), (x: 2.0, y: 2.0), (x: 0.0, y: 4.0)]]);
        let clip = grid().clip(&tri).unwrap().unwrap();
        assert_eq!(clip.cells, array![[None, None], [Some(10), None]]);
    }

    #[test]
    fn holes_are_excluded() {
        let outer = polygon!(
            exterior: [(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
            interiors: [[(x: 1.0, y: 1.0), (x: 3.0, y: 1.0), (x: 3.0, y: 3.0), (x: 1.0, y: 3.0)]],
        );
        let clip = grid().clip(&MultiPolygon(vec![outer])).unwrap().unwrap();
        assert_eq!(clip.cells[(1, 1)], None);
        assert_eq!(clip.cells[(0, 0)], Some(10));
        assert_eq!(clip.count(), 16 - 4 - 2);
    }

    #[test]
    fn disjoint_polygon_is_empty() {
        assert!(grid().clip(&square(10.0, 10.0, 12.0, 12.0)).unwrap().is_none());
    }

    #[test]
    fn nodata_only_polygon_is_empty() {
        assert!(grid().clip(&square(3.0, 0.0, 4.0, 2.0)).unwrap().is_none());
    }

    #[test]
    fn invalid_geometry_is_an_error() {
        assert!(matches!(grid().clip(&MultiPolygon(vec![])), Err(GridError::InvalidGeometry(_))));
        assert!(matches!(
            grid().clip(&square(0.0, 0.0, f64::NAN, 1.0)),
            Err(GridError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn relabel_drops_rejected_codes() {
        let clip = grid().clip(&square(0.0, 2.0, 2.0, 4.0)).unwrap().unwrap();
        let labels = clip.relabel(|v| (v == 10).then_some('t'));
        assert_eq!(labels, array![[Some('t'), Some('t')], [Some('t'), None]]);
    }
}
