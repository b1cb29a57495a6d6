//! Geometry, spatial indexing, and validation.

pub mod geometry;
pub mod spatial;
pub mod validation;
