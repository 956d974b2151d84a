//! Error types for drizzlemap operations.

use thiserror::Error;

/// Errors that can occur while building or inverting a pixmap.
///
/// Polygon clipping never fails: degenerate overlaps are ordinary results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrizzleError {
    /// A pixmap needs at least one row and one column.
    #[error("pixmap has no samples")]
    EmptyPixmap,

    /// The sample buffer does not match the requested grid shape.
    #[error("expected {width}x{height} samples, got {len}")]
    ShapeMismatch {
        /// Requested number of columns.
        width: usize,
        /// Requested number of rows.
        height: usize,
        /// Number of samples supplied.
        len: usize,
    },

    /// Every sample of the pixmap is non-finite.
    #[error("pixmap has no valid samples")]
    NoValidSamples,

    /// No input coordinate within the allowed margin maps to the target.
    #[error("target ({x}, {y}) is outside the mapped region")]
    Unreachable {
        /// Target x coordinate.
        x: f64,
        /// Target y coordinate.
        y: f64,
    },
}

/// Result alias for fallible drizzlemap operations.
pub type Result<T> = std::result::Result<T, DrizzleError>;
