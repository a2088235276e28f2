use geo::Coord;

/// Affine map from pixel space `(col, row)` to world space `(x, y)`.
///
/// Uses the GDAL/rasterio coefficient layout:
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// Pixel `(0, 0)` has its upper-left corner at `(c, f)`; a north-up grid has
/// `b == d == 0` and a negative `e`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform with square or rectangular pixels.
    pub const fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, origin_x, 0.0, -pixel_height, origin_y)
    }

    pub const fn identity() -> Self { Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0) }

    /// Map a (possibly fractional) pixel position to world coordinates.
    #[inline]
    pub fn apply(&self, col: f64, row: f64) -> Coord<f64> {
        Coord {
            x: self.a * col + self.b * row + self.c,
            y: self.d * col + self.e * row + self.f,
        }
    }

    #[inline] pub fn determinant(&self) -> f64 { self.a * self.e - self.b * self.d }

    /// Inverse transform (world to pixel), or `None` for degenerate pixels.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() { return None }

        let ia = self.e / det;
        let ib = -self.b / det;
        let id = -self.d / det;
        let ie = self.a / det;
        Some(Self::new(
            ia, ib, -(ia * self.c + ib * self.f),
            id, ie, -(id * self.c + ie * self.f),
        ))
    }

    /// Transform for a sub-window whose upper-left pixel is `(col_off, row_off)`.
    pub fn shifted(&self, col_off: usize, row_off: usize) -> Self {
        let origin = self.apply(col_off as f64, row_off as f64);
        Self { c: origin.x, f: origin.y, ..*self }
    }
}

impl Default for Affine {
    fn default() -> Self { Self::identity() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Coord<f64>, b: Coord<f64>) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn north_up_maps_corners() {
        let t = Affine::north_up(100.0, 50.0, 0.5, 0.25);
        assert!(close(t.apply(0.0, 0.0), Coord { x: 100.0, y: 50.0 }));
        assert!(close(t.apply(2.0, 4.0), Coord { x: 101.0, y: 49.0 }));
    }

    #[test]
    fn inverse_round_trips_rotated_transform() {
        let t = Affine::new(2.0, 0.5, 10.0, -0.3, -1.5, 20.0);
        let inv = t.inverse().unwrap();
        let world = t.apply(3.25, 7.5);
        assert!(close(inv.apply(world.x, world.y), Coord { x: 3.25, y: 7.5 }));
    }

    #[test]
    fn singular_transform_has_no_inverse() {
        assert!(Affine::new(1.0, 2.0, 0.0, 2.0, 4.0, 0.0).inverse().is_none());
    }

    #[test]
    fn shifted_moves_origin_by_whole_pixels() {
        let t = Affine::north_up(0.0, 10.0, 1.0, 1.0);
        let s = t.shifted(3, 2);
        assert!(close(s.apply(0.0, 0.0), Coord { x: 3.0, y: 8.0 }));
        assert_eq!(s.a, t.a);
        assert_eq!(s.e, t.e);
    }
}
