//! drizzlemap - Geometry for flux-conserving image resampling
//!
//! Drizzling drops each input pixel onto an output grid and shares its flux
//! between the output pixels it overlaps. This library provides the two
//! geometric pieces that needs:
//!
//! - [`intersect_convex_polygons`]: the overlap of an input pixel footprint
//!   with an output pixel, as a convex polygon
//! - [`invert_pixmap`]: the input pixel coordinate that a tabulated forward
//!   map sends to a given output coordinate
//!
//! plus the exact quadrilateral/pixel overlap ([`PixelFootprint`]) and the
//! scanline limits ([`Scanner`]) used by the resampling kernels.
//!
//! # Example
//!
//! ```
//! use drizzlemap::{intersect_convex_polygons, invert_pixmap, Pixmap, Point2, Polygon};
//!
//! let pixel = Polygon::<f64>::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
//! let shifted = Polygon::from_coords(&[(0.5, 0.5), (1.5, 0.5), (1.5, 1.5), (0.5, 1.5)]);
//! assert!((intersect_convex_polygons(&pixel, &shifted).area() - 0.25).abs() < 1e-12);
//!
//! let pixmap = Pixmap::from_fn(16, 16, |c, r| Point2::new(c as f64 + 0.5, r as f64)).unwrap();
//! let input = invert_pixmap(&pixmap, Point2::new(4.0, 7.25)).unwrap();
//! assert!((input.x - 3.5).abs() < 1e-9 && (input.y - 7.25).abs() < 1e-9);
//! ```

pub mod bounds;
pub mod error;
pub mod pixmap;
pub mod polygon;
pub mod primitives;
#[cfg(feature = "simd")]
pub mod simd;
pub mod tolerance;

pub use bounds::Aabb2;
pub use error::DrizzleError;
pub use pixmap::{
    invert_pixmap, invert_pixmap_with_config, CoarseSearch, InvertConfig, Pixmap, PixmapInverter,
};
pub use polygon::{
    intersect_convex_polygons, intersect_convex_polygons_with_tolerance, rect_pixel_overlap,
    ConvexPolygonClipper, PixelFootprint, Polygon, Scanline, Scanner,
};
pub use primitives::{Affine2, Point2, Vec2};
pub use tolerance::{orient2d, Orientation, Tolerance};
