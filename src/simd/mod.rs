//! SIMD helpers for `f64` pixmaps.
//!
//! Enabled with the `simd` feature. Results match the scalar code paths.

mod distance;
mod point;

pub use distance::{distances_squared_to_point, nearest_point_index, nearest_sample};
pub use point::Point2x4;
