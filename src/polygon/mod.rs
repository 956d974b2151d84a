//! Convex polygons and their overlap with pixels.
//!
//! This module provides:
//! - The [`Polygon`] type with area, orientation and containment helpers
//! - Convex polygon intersection ([`intersect_convex_polygons`])
//! - Exact pixel overlap areas for quadrilateral footprints ([`PixelFootprint`])
//! - Scanline limits for rasterising a convex polygon ([`Scanner`])
//!
//! # Example
//!
//! ```
//! use drizzlemap::polygon::{intersect_convex_polygons, Polygon};
//!
//! let p = Polygon::<f64>::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
//! let q = Polygon::from_coords(&[(-0.1, 0.0), (1.1, 0.0), (0.5, 0.6)]);
//!
//! let overlap = intersect_convex_polygons(&p, &q);
//! assert_eq!(overlap.len(), 5);
//! assert!((overlap.area() - 0.35).abs() < 1e-12);
//! ```

mod clip;
mod core;
mod overlap;
mod scanner;

pub use clip::{
    intersect_convex_polygons, intersect_convex_polygons_with_tolerance, ConvexPolygonClipper,
};
pub use core::{polygon_area, polygon_signed_area, Polygon};
pub use overlap::{rect_pixel_overlap, PixelFootprint};
pub use scanner::{Scanline, Scanner};
