//! R*-tree index over service-area bounding boxes.
//!
//! Each area is stored once in an id map together with its canonical geometry
//! and payload, and contributes one or two boxes (two when it crosses the
//! antimeridian) to the tree. A lookup prunes with the tree and then refines
//! candidates with the exact geodesic predicate.
//!
//! # Example
//!
//! ```rust
//! use geofence::compute::geometry::build_multi_polygon;
//! use geofence::compute::spatial::AreaIndex;
//! use uuid::Uuid;
//!
//! let square = vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]];
//! let geometry = build_multi_polygon(&[square.as_slice()]).unwrap();
//!
//! let mut index = AreaIndex::new();
//! let id = Uuid::new_v4();
//! index.insert(id, geometry, "downtown");
//!
//! let hits = index.locate(0.5, 0.5);
//! assert_eq!(hits, vec![(id, "downtown")]);
//! assert!(index.locate(2.0, 2.0).is_empty());
//! ```

use super::envelope::{LngLatBox, area_envelopes};
use crate::compute::geometry::GeoMultiPolygon;
use rstar::{AABB, RTree};
use rustc_hash::FxHashMap;
use uuid::Uuid;

/// Bounding box of one area fragment in the R*-tree.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEnvelope {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
    pub id: Uuid,
}

impl IndexedEnvelope {
    fn new(bbox: LngLatBox, id: Uuid) -> Self {
        Self {
            min_lng: bbox.min_lng,
            min_lat: bbox.min_lat,
            max_lng: bbox.max_lng,
            max_lat: bbox.max_lat,
            id,
        }
    }
}

impl rstar::RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}

#[derive(Debug, Clone)]
struct IndexedArea<T> {
    geometry: GeoMultiPolygon,
    payload: T,
    envelopes: Vec<IndexedEnvelope>,
}

/// Spatial index from area id to canonical geometry and payload.
#[derive(Debug)]
pub struct AreaIndex<T> {
    tree: RTree<IndexedEnvelope>,
    areas: FxHashMap<Uuid, IndexedArea<T>>,
}

impl<T> AreaIndex<T> {
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            areas: FxHashMap::default(),
        }
    }

    /// Build an index in one pass with R*-tree bulk loading. A repeated id
    /// keeps its last entry.
    pub fn bulk_load(entries: impl IntoIterator<Item = (Uuid, GeoMultiPolygon, T)>) -> Self {
        let mut areas = FxHashMap::default();
        for (id, geometry, payload) in entries {
            let envelopes = area_envelopes(&geometry)
                .into_iter()
                .map(|bbox| IndexedEnvelope::new(bbox, id))
                .collect();
            areas.insert(
                id,
                IndexedArea {
                    geometry,
                    payload,
                    envelopes,
                },
            );
        }

        let boxes = areas
            .values()
            .flat_map(|area| area.envelopes.iter().cloned())
            .collect();

        Self {
            tree: RTree::bulk_load(boxes),
            areas,
        }
    }

    /// Index an area, replacing any entry already stored under `id`.
    pub fn insert(&mut self, id: Uuid, geometry: GeoMultiPolygon, payload: T) {
        self.remove(&id);

        let envelopes: Vec<_> = area_envelopes(&geometry)
            .into_iter()
            .map(|bbox| IndexedEnvelope::new(bbox, id))
            .collect();
        for envelope in &envelopes {
            self.tree.insert(envelope.clone());
        }

        self.areas.insert(
            id,
            IndexedArea {
                geometry,
                payload,
                envelopes,
            },
        );
    }

    /// Replace an area's geometry and payload. Same as [`AreaIndex::insert`].
    pub fn update(&mut self, id: Uuid, geometry: GeoMultiPolygon, payload: T) {
        self.insert(id, geometry, payload);
    }

    /// Remove an area, returning its geometry and payload if it was indexed.
    pub fn remove(&mut self, id: &Uuid) -> Option<(GeoMultiPolygon, T)> {
        let area = self.areas.remove(id)?;
        for envelope in &area.envelopes {
            self.tree.remove(envelope);
        }
        Some((area.geometry, area.payload))
    }

    pub fn contains_id(&self, id: &Uuid) -> bool {
        self.areas.contains_key(id)
    }

    /// Payload of an indexed area, for in-place edits that leave its
    /// geometry alone.
    pub fn payload_mut(&mut self, id: &Uuid) -> Option<&mut T> {
        self.areas.get_mut(id).map(|area| &mut area.payload)
    }

    /// Ids whose boxes contain the position. A superset of the true matches.
    pub fn candidates(&self, lng: f64, lat: f64) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .tree
            .locate_in_envelope_intersecting(&AABB::from_point([lng, lat]))
            .map(|entry| entry.id)
            .collect();

        // -180 and 180 are the same meridian.
        if lng == 180.0 || lng == -180.0 {
            ids.extend(
                self.tree
                    .locate_in_envelope_intersecting(&AABB::from_point([-lng, lat]))
                    .map(|entry| entry.id),
            );
        }

        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Every `(id, payload)` whose area contains the position, boundary
    /// included, in id order.
    pub fn locate(&self, lng: f64, lat: f64) -> Vec<(Uuid, T)>
    where
        T: Clone,
    {
        self.candidates(lng, lat)
            .into_iter()
            .filter_map(|id| {
                let area = self.areas.get(&id)?;
                area.geometry
                    .contains(lng, lat)
                    .then(|| (id, area.payload.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn stats(&self) -> AreaIndexStats {
        AreaIndexStats {
            areas: self.areas.len(),
            envelopes: self.tree.size(),
        }
    }
}

impl<T> Default for AreaIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the area index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AreaIndexStats {
    /// Number of indexed areas
    pub areas: usize,
    /// Number of boxes in the R*-tree (antimeridian areas contribute two)
    pub envelopes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::geometry::build_multi_polygon;
    use proptest::prelude::*;
    use proptest::test_runner::Config;

    fn square(min_lng: f64, min_lat: f64, size: f64) -> GeoMultiPolygon {
        let ring = vec![vec![
            [min_lng, min_lat],
            [min_lng + size, min_lat],
            [min_lng + size, min_lat + size],
            [min_lng, min_lat + size],
        ]];
        build_multi_polygon(&[ring.as_slice()]).unwrap()
    }

    #[test]
    fn test_insert_and_locate() {
        let mut index = AreaIndex::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        index.insert(a, square(0.0, 0.0, 2.0), "a");
        index.insert(b, square(1.0, 1.0, 2.0), "b");

        assert_eq!(index.locate(0.5, 0.5), vec![(a, "a")]);
        assert_eq!(index.locate(2.5, 2.5), vec![(b, "b")]);

        let mut both: Vec<_> = index.locate(1.5, 1.5).into_iter().map(|(_, p)| p).collect();
        both.sort();
        assert_eq!(both, vec!["a", "b"]);

        assert!(index.locate(10.0, 10.0).is_empty());
    }

    #[test]
    fn test_candidates_are_refined() {
        let mut index = AreaIndex::new();
        let id = Uuid::new_v4();
        // Triangle: its box contains (0.9, 0.9) but the triangle does not.
        let triangle = vec![vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]];
        index.insert(id, build_multi_polygon(&[triangle.as_slice()]).unwrap(), ());

        assert_eq!(index.candidates(0.9, 0.9), vec![id]);
        assert!(index.locate(0.9, 0.9).is_empty());
        assert_eq!(index.locate(0.2, 0.2).len(), 1);
    }

    #[test]
    fn test_update_replaces_geometry() {
        let mut index = AreaIndex::new();
        let id = Uuid::new_v4();
        index.insert(id, square(0.0, 0.0, 1.0), 1);
        index.update(id, square(10.0, 10.0, 1.0), 2);

        assert!(index.locate(0.5, 0.5).is_empty());
        assert_eq!(index.locate(10.5, 10.5), vec![(id, 2)]);
        assert_eq!(index.stats().areas, 1);
        assert_eq!(index.stats().envelopes, 1);
    }

    #[test]
    fn test_remove() {
        let mut index = AreaIndex::new();
        let id = Uuid::new_v4();
        index.insert(id, square(0.0, 0.0, 1.0), ());

        assert!(index.remove(&id).is_some());
        assert!(index.remove(&id).is_none());
        assert!(index.locate(0.5, 0.5).is_empty());
        assert!(index.is_empty());
        assert_eq!(index.stats().envelopes, 0);
    }

    #[test]
    fn test_antimeridian_area() {
        let mut index = AreaIndex::new();
        let id = Uuid::new_v4();
        let ring = vec![vec![[179.0, -1.0], [-179.0, -1.0], [-179.0, 1.0], [179.0, 1.0]]];
        index.insert(id, build_multi_polygon(&[ring.as_slice()]).unwrap(), ());

        assert_eq!(index.stats().envelopes, 2);
        assert_eq!(index.locate(179.5, 0.0).len(), 1);
        assert_eq!(index.locate(-179.5, 0.0).len(), 1);
        assert_eq!(index.locate(180.0, 0.0).len(), 1);
        assert_eq!(index.locate(-180.0, 0.0).len(), 1);
        assert!(index.locate(0.0, 0.0).is_empty());
    }

    #[test]
    fn test_antimeridian_mirror() {
        let mut index = AreaIndex::new();
        let id = Uuid::new_v4();
        index.insert(id, square(-180.0, 0.0, 5.0), ());
        assert_eq!(index.candidates(180.0, 2.0), vec![id]);
        assert_eq!(index.locate(180.0, 2.0).len(), 1);
    }

    #[test]
    fn test_polar_area() {
        let mut index = AreaIndex::new();
        let id = Uuid::new_v4();
        let ring = vec![vec![[0.0, 80.0], [90.0, 80.0], [180.0, 80.0], [-90.0, 80.0]]];
        index.insert(id, build_multi_polygon(&[ring.as_slice()]).unwrap(), ());

        assert_eq!(index.locate(0.0, 90.0).len(), 1);
        assert_eq!(index.locate(-135.0, 85.0).len(), 1);
        assert!(index.locate(0.0, 60.0).is_empty());
    }

    #[test]
    fn test_bulk_load_matches_inserts() {
        let ids: Vec<Uuid> = (0..50).map(|_| Uuid::new_v4()).collect();
        let index = AreaIndex::bulk_load(
            ids.iter()
                .enumerate()
                .map(|(i, id)| (*id, square(i as f64, 0.0, 0.5), i)),
        );

        assert_eq!(index.len(), 50);
        assert_eq!(index.locate(7.25, 0.25), vec![(ids[7], 7)]);
        assert!(index.locate(7.75, 0.25).is_empty());
    }

    #[test]
    fn test_payload_mut_keeps_geometry() {
        let mut index = AreaIndex::new();
        let id = Uuid::new_v4();
        index.insert(id, square(0.0, 0.0, 1.0), "old");

        *index.payload_mut(&id).unwrap() = "new";
        assert_eq!(index.locate(0.5, 0.5), vec![(id, "new")]);
        assert!(index.payload_mut(&Uuid::new_v4()).is_none());
    }

    fn wrap_lng(lng: f64) -> f64 {
        (lng + 180.0).rem_euclid(360.0) - 180.0
    }

    /// Lng/lat boxes (some crossing the antimeridian) and polar caps.
    fn random_ring() -> impl Strategy<Value = Vec<[f64; 2]>> {
        let lng_lat_box = (-180.0_f64..180.0, -85.0_f64..60.0, 0.5_f64..40.0, 0.5_f64..25.0)
            .prop_map(|(lng, lat, width, height)| {
                let east = wrap_lng(lng + width);
                vec![[lng, lat], [east, lat], [east, lat + height], [lng, lat + height]]
            });
        let polar_cap = (any::<bool>(), 55.0_f64..88.0, 3_usize..8, -180.0_f64..180.0)
            .prop_map(|(north, lat, sides, start)| {
                let lat = if north { lat } else { -lat };
                (0..sides)
                    .map(|k| [wrap_lng(start + 360.0 * k as f64 / sides as f64), lat])
                    .collect()
            });
        prop_oneof![3 => lng_lat_box, 1 => polar_cap]
    }

    proptest! {
        #![proptest_config(Config::with_cases(64))]

        #[test]
        fn locate_matches_full_scan(
            rings in prop::collection::vec(random_ring(), 1..40),
            extra in prop::collection::vec((-180.0_f64..=180.0, -90.0_f64..=90.0), 200),
        ) {
            let areas: Vec<(Uuid, GeoMultiPolygon)> = rings
                .iter()
                .map(|ring| {
                    let polygon = vec![ring.clone()];
                    (Uuid::new_v4(), build_multi_polygon(&[polygon.as_slice()]).unwrap())
                })
                .collect();

            let mut index = AreaIndex::new();
            for (id, geometry) in &areas {
                index.insert(*id, geometry.clone(), ());
            }

            let grid = (0..=48).flat_map(|i| {
                (0..=36).map(move |j| (-180.0 + 7.5 * f64::from(i), -90.0 + 5.0 * f64::from(j)))
            });
            for (lng, lat) in grid.chain(extra) {
                let mut expected: Vec<Uuid> = areas
                    .iter()
                    .filter(|(_, geometry)| geometry.contains(lng, lat))
                    .map(|(id, _)| *id)
                    .collect();
                expected.sort_unstable();

                let found: Vec<Uuid> = index.locate(lng, lat).into_iter().map(|(id, _)| id).collect();
                prop_assert_eq!(found, expected, "mismatch at ({}, {})", lng, lat);
            }
        }
    }
}
