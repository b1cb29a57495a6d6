//! Geodesic point-in-polygon predicate.
//!
//! Edges are great-circle arcs. A point is classified against a ring by its
//! spherical winding number: the signed angles the edges subtend around the
//! point's axis add up to a multiple of 2π. Because canonical outer rings wind
//! counter-clockwise, a point the ring encloses winds +1 while its antipode
//! winds -1, so no reference point outside the polygon is needed.
//!
//! The region is closed: points on an outer ring or on a hole boundary are
//! contained.

use super::sphere::Vec3;
use crate::compute::geometry::{GeoPolygon, SphericalRing};
use std::f64::consts::TAU;

/// Distance from a great circle (on the unit sphere) treated as lying on it.
const ON_EDGE_EPS: f64 = 1e-12;

/// Where a point lies relative to a single ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingPosition {
    Inside,
    Outside,
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingRole {
    Outer,
    Hole,
}

/// True when `point` lies inside the polygon's outer ring, on any of its
/// boundaries, and not strictly inside a hole.
pub fn polygon_contains(polygon: &GeoPolygon, point: &Vec3) -> bool {
    match classify(polygon.outer(), point, RingRole::Outer) {
        RingPosition::Outside => return false,
        RingPosition::Boundary => return true,
        RingPosition::Inside => {}
    }

    for hole in polygon.holes() {
        match classify(hole, point, RingRole::Hole) {
            RingPosition::Inside => return false,
            RingPosition::Boundary => return true,
            RingPosition::Outside => {}
        }
    }

    true
}

fn classify(ring: &SphericalRing, point: &Vec3, role: RingRole) -> RingPosition {
    if ring.edges().any(|(a, b)| on_arc(a, b, point)) {
        return RingPosition::Boundary;
    }

    let winding = winding_number(ring, point);
    let enclosed = match role {
        RingRole::Outer => winding > 0.5,
        RingRole::Hole => winding < -0.5,
    };

    if enclosed {
        RingPosition::Inside
    } else {
        RingPosition::Outside
    }
}

/// Signed number of turns the ring makes around the axis through `point`.
fn winding_number(ring: &SphericalRing, point: &Vec3) -> f64 {
    ring.edges()
        .map(|(a, b)| subtended_angle(a, b, point))
        .sum::<f64>()
        / TAU
}

/// Signed angle between `a` and `b` as seen looking down on `p` from outside
/// the sphere, counter-clockwise positive.
#[inline]
fn subtended_angle(a: &Vec3, b: &Vec3, p: &Vec3) -> f64 {
    let y = p.dot(&a.cross(b));
    let x = a.dot(b) - p.dot(a) * p.dot(b);
    y.atan2(x)
}

/// True when `p` lies on the minor arc from `a` to `b`, endpoints included.
#[inline]
fn on_arc(a: &Vec3, b: &Vec3, p: &Vec3) -> bool {
    let normal = a.cross(b);
    let len = normal.norm();
    if len <= f64::EPSILON {
        return false;
    }

    if p.dot(&normal).abs() > ON_EDGE_EPS * len {
        return false;
    }

    let tolerance = -ON_EDGE_EPS * len;
    a.cross(p).dot(&normal) >= tolerance && p.cross(b).dot(&normal) >= tolerance
}
