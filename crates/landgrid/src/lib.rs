//! Categorical raster grids for land-cover overlays.
//!
//! A [`Grid`] holds one band of integer class codes together with the affine
//! transform that places it in world coordinates and an optional nodata
//! sentinel. Grids are loaded once and only ever read afterwards, so a
//! `&Grid` can be shared freely across worker threads.

pub mod affine;
pub mod clip;
pub mod error;
pub mod grid;
pub mod io;
pub mod vectorize;

pub use affine::Affine;
pub use clip::Clip;
pub use error::GridError;
pub use grid::{Grid, Window};
pub use vectorize::{polygonize, Shape};
