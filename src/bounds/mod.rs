//! Bounding boxes for quick rejection tests.

mod aabb;

pub use aabb::Aabb2;
