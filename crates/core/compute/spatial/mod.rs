//! Spherical geometry primitives and the area index.

pub mod containment;
pub mod envelope;
pub mod rtree;
pub mod sphere;

pub use containment::polygon_contains;
pub use envelope::LngLatBox;
pub use rtree::{AreaIndex, AreaIndexStats};
