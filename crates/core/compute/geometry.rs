//! Canonical service-area geometry.
//!
//! Raw rings arrive as `[longitude, latitude]` pairs. Building a polygon
//! validates every coordinate, closes the rings, drops repeated vertices and
//! normalizes winding: outer rings counter-clockwise, holes clockwise.
//!
//! Winding is measured on the sphere. A ring's interior is the side that holds
//! the centroid of its vertices, so every ring is taken to enclose less than a
//! hemisphere. This matches how geography columns in spatial databases read
//! polygons and lets a ring enclose a pole or cross the antimeridian without
//! any special encoding.

use crate::compute::spatial::containment;
use crate::compute::spatial::sphere::Vec3;
use crate::compute::validation::check_lng_lat;
use crate::error::{GeofenceError, Result};
use geofence_types::area::{AreaGeometry, RawRing};

/// Vertices closer than this on the unit sphere are the same vertex (~6 µm).
const SAME_VERTEX_EPS: f64 = 1e-12;

/// Rings whose vector area is this close to perpendicular to their centroid
/// direction enclose no region.
const DEGENERATE_RATIO: f64 = 1e-9;

/// A closed ring on the sphere, stored without the repeated closing vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalRing {
    vertices: Vec<Vec3>,
    coords: Vec<[f64; 2]>,
}

impl SphericalRing {
    /// Unit vectors of the distinct vertices, in winding order.
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// `[lng, lat]` of the distinct vertices, in winding order.
    pub fn coords(&self) -> &[[f64; 2]] {
        &self.coords
    }

    /// Consecutive vertex pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (&Vec3, &Vec3)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }

    /// Sum of vertex unit vectors. Points into the ring's interior.
    pub fn centroid_direction(&self) -> Vec3 {
        self.vertices
            .iter()
            .fold(Vec3::new(0.0, 0.0, 0.0), |acc, v| acc.add(v))
    }

    fn reverse(&mut self) {
        self.vertices.reverse();
        self.coords.reverse();
    }
}

/// Immutable canonical polygon: one outer ring and zero or more holes.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPolygon {
    outer: SphericalRing,
    holes: Vec<SphericalRing>,
}

impl GeoPolygon {
    pub fn outer(&self) -> &SphericalRing {
        &self.outer
    }

    pub fn holes(&self) -> &[SphericalRing] {
        &self.holes
    }

    /// Closed-set containment of a `(lng, lat)` position, see
    /// [`containment::polygon_contains`].
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        containment::polygon_contains(self, &Vec3::from_lng_lat(lng, lat))
    }
}

/// Ordered, non-empty collection of polygons treated as one region.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMultiPolygon {
    polygons: Vec<GeoPolygon>,
}

impl GeoMultiPolygon {
    pub fn polygons(&self) -> &[GeoPolygon] {
        &self.polygons
    }

    /// True when any member polygon contains the position.
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        let point = Vec3::from_lng_lat(lng, lat);
        self.polygons
            .iter()
            .any(|polygon| containment::polygon_contains(polygon, &point))
    }
}

/// Build a canonical polygon from raw rings (outer ring first, then holes).
///
/// # Errors
///
/// [`GeofenceError::InvalidGeometry`] when there is no ring, a ring has fewer
/// than 3 distinct points, a coordinate is non-finite or out of range, two
/// consecutive vertices are antipodal, or a ring encloses no area.
///
/// # Examples
///
/// ```
/// use geofence::compute::geometry::build_polygon;
///
/// let square = vec![vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]];
/// let polygon = build_polygon(&square).unwrap();
/// assert!(polygon.contains(0.5, 0.5));
/// assert!(!polygon.contains(2.0, 2.0));
///
/// let segment = vec![vec![[0.0, 0.0], [1.0, 1.0]]];
/// assert!(build_polygon(&segment).is_err());
/// ```
pub fn build_polygon(rings: &[RawRing]) -> Result<GeoPolygon> {
    let Some((outer_raw, holes_raw)) = rings.split_first() else {
        return Err(GeofenceError::InvalidGeometry(
            "Polygon must have an outer ring".to_string(),
        ));
    };

    let outer = build_ring(outer_raw, "outer ring", Winding::CounterClockwise)?;
    let holes = holes_raw
        .iter()
        .enumerate()
        .map(|(idx, raw)| build_ring(raw, &format!("hole {}", idx), Winding::Clockwise))
        .collect::<Result<Vec<_>>>()?;

    Ok(GeoPolygon { outer, holes })
}

/// Build a canonical multi-polygon from a list of raw polygons.
pub fn build_multi_polygon(polygons: &[&[RawRing]]) -> Result<GeoMultiPolygon> {
    if polygons.is_empty() {
        return Err(GeofenceError::InvalidGeometry(
            "Area must contain at least one polygon".to_string(),
        ));
    }

    let polygons = polygons
        .iter()
        .enumerate()
        .map(|(idx, rings)| {
            build_polygon(rings).map_err(|e| match e {
                GeofenceError::InvalidGeometry(msg) if polygons.len() > 1 => {
                    GeofenceError::InvalidGeometry(format!("Polygon {}: {}", idx, msg))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(GeoMultiPolygon { polygons })
}

/// Build the canonical geometry of a wire-format service area.
pub fn build_area(area: &AreaGeometry) -> Result<GeoMultiPolygon> {
    build_multi_polygon(&area.polygons())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Winding {
    CounterClockwise,
    Clockwise,
}

fn build_ring(raw: &[[f64; 2]], label: &str, winding: Winding) -> Result<SphericalRing> {
    if raw.len() < 3 {
        return Err(GeofenceError::InvalidGeometry(format!(
            "{} has {} points, a ring needs at least 3",
            label,
            raw.len()
        )));
    }

    let mut ring = SphericalRing {
        vertices: Vec::with_capacity(raw.len()),
        coords: Vec::with_capacity(raw.len()),
    };

    for (idx, &[lng, lat]) in raw.iter().enumerate() {
        check_lng_lat(lng, lat).map_err(|e| {
            GeofenceError::InvalidGeometry(format!("{} point at index {}: {}", label, idx, e))
        })?;

        let vertex = Vec3::from_lng_lat(lng, lat);
        if ring
            .vertices
            .last()
            .is_some_and(|prev| same_vertex(prev, &vertex))
        {
            continue;
        }
        ring.vertices.push(vertex);
        ring.coords.push([lng, lat]);
    }

    // Drop the explicit closing point (and any run of repeats of the start).
    while ring.vertices.len() > 1
        && same_vertex(&ring.vertices[0], &ring.vertices[ring.vertices.len() - 1])
    {
        ring.vertices.pop();
        ring.coords.pop();
    }

    if ring.vertices.len() < 3 {
        return Err(GeofenceError::InvalidGeometry(format!(
            "{} has {} distinct points, a ring needs at least 3",
            label,
            ring.vertices.len()
        )));
    }

    if let Some((a, _)) = ring.edges().find(|(a, b)| a.dot(b) <= -1.0 + 1e-12) {
        return Err(GeofenceError::InvalidGeometry(format!(
            "{} has an edge between antipodal points starting at lat {:.6}",
            label,
            a.lat()
        )));
    }

    let vector_area = ring
        .edges()
        .fold(Vec3::new(0.0, 0.0, 0.0), |acc, (a, b)| acc.add(&a.cross(b)));
    let centroid = ring.centroid_direction();
    let alignment = vector_area.dot(&centroid);
    let scale = vector_area.norm() * centroid.norm();

    if scale <= 0.0 || alignment.abs() <= DEGENERATE_RATIO * scale {
        return Err(GeofenceError::InvalidGeometry(format!("{} encloses no area", label)));
    }

    let is_ccw = alignment > 0.0;
    if is_ccw != (winding == Winding::CounterClockwise) {
        ring.reverse();
    }

    Ok(ring)
}

#[inline]
fn same_vertex(a: &Vec3, b: &Vec3) -> bool {
    a.sub(b).dot(&a.sub(b)) <= SAME_VERTEX_EPS * SAME_VERTEX_EPS
}

/// Signed orientation of a canonical ring: positive for counter-clockwise.
#[cfg(test)]
fn ring_orientation(ring: &SphericalRing) -> f64 {
    ring.edges()
        .fold(Vec3::new(0.0, 0.0, 0.0), |acc, (a, b)| acc.add(&a.cross(b)))
        .dot(&ring.centroid_direction())
}
