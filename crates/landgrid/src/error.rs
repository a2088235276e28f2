use std::path::PathBuf;

/// Errors raised while loading or reading a [`Grid`](crate::Grid).
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("failed to read raster {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode TIFF: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// The file decoded, but its contents cannot be used as a categorical grid.
    #[error("invalid raster: {0}")]
    Invalid(String),

    /// The file extension does not name a supported raster format.
    #[error("unsupported raster format: {0}")]
    UnsupportedFormat(String),

    /// The affine transform cannot be inverted (zero-area pixels).
    #[error("raster transform is not invertible")]
    SingularTransform,

    /// The clipping geometry has no rings or carries non-finite coordinates.
    #[error("invalid clip geometry: {0}")]
    InvalidGeometry(String),
}
