//! Longitude/latitude bounding boxes for spherical rings.
//!
//! A ring's box must cover every point of its great-circle edges, not only its
//! vertices. Three cases need care:
//!
//! - an edge can bulge poleward past both of its endpoints,
//! - a ring that crosses the antimeridian is split into two boxes,
//! - a ring that encloses or touches a pole spans all longitudes.

use super::sphere::Vec3;
use crate::compute::geometry::{GeoMultiPolygon, GeoPolygon, SphericalRing};

/// Padding in degrees that absorbs rounding at box edges.
const PAD: f64 = 1e-9;

/// Latitude treated as the pole when an edge runs over it.
const POLE_LAT: f64 = 90.0 - 1e-9;

/// Axis-aligned box in degrees, never crossing the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLatBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl LngLatBox {
    pub fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        (self.min_lng..=self.max_lng).contains(&lng) && (self.min_lat..=self.max_lat).contains(&lat)
    }

    fn padded(self) -> Self {
        Self {
            min_lng: (self.min_lng - PAD).max(-180.0),
            min_lat: (self.min_lat - PAD).max(-90.0),
            max_lng: (self.max_lng + PAD).min(180.0),
            max_lat: (self.max_lat + PAD).min(90.0),
        }
    }
}

/// Boxes covering a multi-polygon. Holes never widen a box.
pub fn area_envelopes(area: &GeoMultiPolygon) -> Vec<LngLatBox> {
    area.polygons().iter().flat_map(polygon_envelopes).collect()
}

pub fn polygon_envelopes(polygon: &GeoPolygon) -> Vec<LngLatBox> {
    ring_envelopes(polygon.outer())
}

/// One box, or two when the ring crosses the antimeridian.
pub fn ring_envelopes(ring: &SphericalRing) -> Vec<LngLatBox> {
    let (mut min_lat, mut max_lat) = latitude_range(ring);
    let coords = ring.coords();

    // Walk the ring with longitudes unwrapped so edges never jump by 360.
    let mut unwrapped = coords[0][0];
    let (mut min_u, mut max_u) = (unwrapped, unwrapped);
    for i in 0..coords.len() {
        let next = coords[(i + 1) % coords.len()][0];
        unwrapped += normalize_delta(next - coords[i][0]);
        min_u = min_u.min(unwrapped);
        max_u = max_u.max(unwrapped);
    }
    let sweep = unwrapped - coords[0][0];

    let encloses_pole = sweep.abs() > 180.0;
    if encloses_pole {
        if ring.centroid_direction().z > 0.0 {
            max_lat = 90.0;
        } else {
            min_lat = -90.0;
        }
    }

    if encloses_pole || max_lat >= POLE_LAT || min_lat <= -POLE_LAT || max_u - min_u >= 360.0 {
        return vec![LngLatBox::new(-180.0, min_lat, 180.0, max_lat).padded()];
    }

    let shift = 360.0 * ((min_u + 180.0) / 360.0).floor();
    let (min_lng, max_lng) = (min_u - shift, max_u - shift);

    if max_lng > 180.0 {
        vec![
            LngLatBox::new(min_lng, min_lat, 180.0, max_lat).padded(),
            LngLatBox::new(-180.0, min_lat, max_lng - 360.0, max_lat).padded(),
        ]
    } else {
        vec![LngLatBox::new(min_lng, min_lat, max_lng, max_lat).padded()]
    }
}

/// Longitude difference folded into (-180, 180].
#[inline]
fn normalize_delta(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta <= -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Latitude extent of the ring including the poleward bulge of its edges.
fn latitude_range(ring: &SphericalRing) -> (f64, f64) {
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    for [_, lat] in ring.coords() {
        min_lat = min_lat.min(*lat);
        max_lat = max_lat.max(*lat);
    }

    for (a, b) in ring.edges() {
        let normal = a.cross(b);
        let Some(unit_normal) = normal.normalized() else {
            continue;
        };

        // Northernmost point of the edge's great circle; none for the equator.
        let Some(top) = Vec3::NORTH
            .sub(&unit_normal.scale(Vec3::NORTH.dot(&unit_normal)))
            .normalized()
        else {
            continue;
        };

        if within_arc(a, b, &normal, &top) {
            max_lat = max_lat.max(top.lat());
        }
        let bottom = top.scale(-1.0);
        if within_arc(a, b, &normal, &bottom) {
            min_lat = min_lat.min(bottom.lat());
        }
    }

    (min_lat, max_lat)
}

/// True when a point of the great circle through `a` and `b` lies on the
/// minor arc between them.
#[inline]
fn within_arc(a: &Vec3, b: &Vec3, normal: &Vec3, point: &Vec3) -> bool {
    a.cross(point).dot(normal) >= 0.0 && point.cross(b).dot(normal) >= 0.0
}
