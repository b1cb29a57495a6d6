//! Live index: canonical geometry of every registered service area
//!
//! Wraps the [`AreaIndex`] in a read-write lock. Every structural change
//! (including the remove and insert that make up an update) happens under a
//! single write-lock acquisition, so readers never observe a half-applied
//! change.
//!
//! Entries carry everything a lookup returns, provider name included, so
//! answering a query never touches the store.

use crate::compute::geometry::{GeoMultiPolygon, build_area};
use crate::compute::spatial::{AreaIndex, AreaIndexStats};
use crate::error::{GeofenceError, Result};
use geofence_types::area::ServiceArea;
use parking_lot::RwLock;
use uuid::Uuid;

/// Index payload: what a lookup needs without touching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedServiceArea {
    pub name: String,
    pub provider: Uuid,
    pub provider_name: String,
    pub price: u64,
}

impl IndexedServiceArea {
    pub fn new(area: &ServiceArea, provider_name: impl Into<String>) -> Self {
        Self {
            name: area.name.clone(),
            provider: area.provider,
            provider_name: provider_name.into(),
            price: area.price,
        }
    }
}

/// Removed index entry, kept so a failed store batch can put it back.
pub type RemovedEntry = (Uuid, GeoMultiPolygon, IndexedServiceArea);

pub struct LiveIndex {
    index: RwLock<AreaIndex<IndexedServiceArea>>,
}

impl LiveIndex {
    pub fn new() -> Self {
        Self {
            index: RwLock::new(AreaIndex::new()),
        }
    }

    /// Replace the whole index with the given service areas.
    ///
    /// `provider_name` resolves owners. Areas whose provider is gone are
    /// skipped with a warning. Stored geometry was validated when it was
    /// written, so a geometry failure here means the store holds data the
    /// core never accepted.
    pub fn rebuild<F>(&self, areas: &[ServiceArea], provider_name: F) -> Result<()>
    where
        F: Fn(&Uuid) -> Result<Option<String>>,
    {
        let mut entries = Vec::with_capacity(areas.len());
        for area in areas {
            let Some(owner) = provider_name(&area.provider)? else {
                log::warn!(
                    "Not indexing service area {}: provider {} does not exist",
                    area.id,
                    area.provider
                );
                continue;
            };

            let geometry = build_area(&area.area).map_err(|e| {
                log::error!("Stored service area {} has invalid geometry: {}", area.id, e);
                GeofenceError::IndexInconsistency(format!(
                    "stored service area {} cannot be indexed: {}",
                    area.id, e
                ))
            })?;
            entries.push((area.id, geometry, IndexedServiceArea::new(area, owner)));
        }

        let rebuilt = AreaIndex::bulk_load(entries);
        log::info!("Rebuilt service area index with {} areas", rebuilt.len());
        *self.index.write() = rebuilt;
        Ok(())
    }

    /// Insert or replace an area in one write-lock acquisition.
    pub fn upsert(&self, area: &ServiceArea, provider_name: &str, geometry: GeoMultiPolygon) {
        self.index.write().update(
            area.id,
            geometry,
            IndexedServiceArea::new(area, provider_name),
        );
    }

    /// Point the given areas at a provider's new name. Returns how many were
    /// indexed.
    pub fn rename_provider(&self, ids: &[Uuid], provider_name: &str) -> usize {
        let mut index = self.index.write();
        let mut renamed = 0;
        for id in ids {
            if let Some(entry) = index.payload_mut(id) {
                entry.provider_name = provider_name.to_string();
                renamed += 1;
            }
        }
        renamed
    }

    pub fn remove(&self, id: &Uuid) -> Option<RemovedEntry> {
        self.index
            .write()
            .remove(id)
            .map(|(geometry, payload)| (*id, geometry, payload))
    }

    /// Remove several areas under one write lock.
    pub fn remove_many(&self, ids: &[Uuid]) -> Vec<RemovedEntry> {
        let mut index = self.index.write();
        ids.iter()
            .filter_map(|id| {
                index
                    .remove(id)
                    .map(|(geometry, payload)| (*id, geometry, payload))
            })
            .collect()
    }

    /// Put back entries returned by [`LiveIndex::remove_many`].
    pub fn restore(&self, entries: Vec<RemovedEntry>) {
        let mut index = self.index.write();
        for (id, geometry, payload) in entries {
            index.insert(id, geometry, payload);
        }
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.index.read().contains_id(id)
    }

    /// Areas containing the position. The read lock is released on return.
    pub fn locate(&self, lng: f64, lat: f64) -> Vec<(Uuid, IndexedServiceArea)> {
        self.index.read().locate(lng, lat)
    }

    pub fn stats(&self) -> AreaIndexStats {
        self.index.read().stats()
    }
}

impl Default for LiveIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geofence_types::area::AreaGeometry;

    fn area(provider: Uuid, name: &str, offset: f64) -> ServiceArea {
        ServiceArea {
            id: Uuid::new_v4(),
            provider,
            name: name.to_string(),
            price: 10,
            area: AreaGeometry::Ring(vec![
                [offset, 0.0],
                [offset + 1.0, 0.0],
                [offset + 1.0, 1.0],
                [offset, 1.0],
            ]),
        }
    }

    #[test]
    fn test_rebuild_resolves_provider_names() {
        let acme = Uuid::new_v4();
        let gone = Uuid::new_v4();
        let kept = area(acme, "kept", 0.0);
        let orphan = area(gone, "orphan", 5.0);

        let index = LiveIndex::new();
        index
            .rebuild(&[kept.clone(), orphan.clone()], |id| {
                Ok((*id == acme).then(|| "Acme".to_string()))
            })
            .unwrap();

        let hits = index.locate(0.5, 0.5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1.provider_name, "Acme");
        assert!(!index.contains(&orphan.id));
        assert_eq!(index.stats().areas, 1);
    }

    #[test]
    fn test_rename_provider_updates_entries() {
        let acme = Uuid::new_v4();
        let first = area(acme, "first", 0.0);
        let second = area(acme, "second", 5.0);

        let index = LiveIndex::new();
        for zone in [&first, &second] {
            index.upsert(zone, "Acme", build_area(&zone.area).unwrap());
        }

        let renamed = index.rename_provider(&[first.id, second.id, Uuid::new_v4()], "Acme 2");
        assert_eq!(renamed, 2);
        assert_eq!(index.locate(0.5, 0.5)[0].1.provider_name, "Acme 2");
        assert_eq!(index.locate(5.5, 0.5)[0].1.provider_name, "Acme 2");
    }

    #[test]
    fn test_remove_many_and_restore() {
        let acme = Uuid::new_v4();
        let zone = area(acme, "zone", 0.0);
        let index = LiveIndex::new();
        index.upsert(&zone, "Acme", build_area(&zone.area).unwrap());

        let removed = index.remove_many(&[zone.id, Uuid::new_v4()]);
        assert_eq!(removed.len(), 1);
        assert!(index.locate(0.5, 0.5).is_empty());

        index.restore(removed);
        assert_eq!(index.locate(0.5, 0.5)[0].0, zone.id);
    }
}
