//! Tabulated forward maps and their inversion.
//!
//! A [`Pixmap`] records, for every input pixel, where it lands in the output
//! plane. Between samples the map is bilinear. [`PixmapInverter`] goes the
//! other way: it locates the cell whose bilinear patch contains an output
//! coordinate and refines the local position with Newton-Raphson.
//!
//! # Example
//!
//! ```
//! use drizzlemap::pixmap::{invert_pixmap, Pixmap};
//! use drizzlemap::Point2;
//!
//! let pixmap = Pixmap::from_fn(8, 8, |col, row| {
//!     Point2::new(0.5 * col as f64 + 100.0, 0.5 * row as f64 - 3.0)
//! })
//! .unwrap();
//!
//! let input = invert_pixmap(&pixmap, Point2::new(101.25, -1.0)).unwrap();
//! assert!((input.x - 2.5).abs() < 1e-9 && (input.y - 4.0).abs() < 1e-9);
//! ```

mod bilinear;
mod grid;
mod invert;
mod search;

pub use bilinear::{BilinearCell, NewtonParams, NewtonSolution};
pub use grid::Pixmap;
pub use invert::{
    invert_pixmap, invert_pixmap_with_config, CoarseSearch, InvertConfig, PixmapInverter,
};
