//! In-memory store implementation.

use super::{Store, StoreOp, StoreStats};
use crate::error::Result;
use geofence_types::area::ServiceArea;
use geofence_types::provider::Provider;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Rows keyed by id that remember the order they were first inserted in.
#[derive(Debug, Clone)]
struct Table<T> {
    rows: FxHashMap<Uuid, (u64, T)>,
    order: BTreeMap<u64, Uuid>,
    next_seq: u64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: FxHashMap::default(),
            order: BTreeMap::new(),
            next_seq: 0,
        }
    }

    fn get(&self, id: &Uuid) -> Option<&T> {
        self.rows.get(id).map(|(_, row)| row)
    }

    /// Insert or replace. A replaced row keeps its position.
    fn put(&mut self, id: Uuid, row: T) -> Option<T> {
        if let Some((_, existing)) = self.rows.get_mut(&id) {
            return Some(std::mem::replace(existing, row));
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.rows.insert(id, (seq, row));
        self.order.insert(seq, id);
        None
    }

    fn remove(&mut self, id: &Uuid) -> Option<T> {
        let (seq, row) = self.rows.remove(id)?;
        self.order.remove(&seq);
        Some(row)
    }

    fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.order
            .values()
            .filter_map(|id| self.rows.get(id).map(|(_, row)| row))
    }

    fn page(&self, offset: usize, limit: usize) -> Vec<T> {
        self.iter().skip(offset).take(limit).cloned().collect()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Plain tables behind the in-memory and snapshot stores.
///
/// Provider names are indexed so uniqueness checks do not scan.
#[derive(Debug, Clone)]
pub(super) struct MemoryState {
    providers: Table<Provider>,
    provider_names: FxHashMap<String, Uuid>,
    service_areas: Table<ServiceArea>,
    operations_count: u64,
}

impl MemoryState {
    pub(super) fn new() -> Self {
        Self {
            providers: Table::new(),
            provider_names: FxHashMap::default(),
            service_areas: Table::new(),
            operations_count: 0,
        }
    }

    /// Providers in insertion order.
    pub(super) fn providers(&self) -> impl Iterator<Item = &Provider> + '_ {
        self.providers.iter()
    }

    /// Service areas in insertion order.
    pub(super) fn service_areas(&self) -> impl Iterator<Item = &ServiceArea> + '_ {
        self.service_areas.iter()
    }

    pub(super) fn apply(&mut self, op: &StoreOp) {
        match op {
            StoreOp::SaveProvider(provider) => {
                if let Some(previous) = self.providers.put(provider.id, provider.clone()) {
                    self.provider_names.remove(&previous.name);
                }
                self.provider_names.insert(provider.name.clone(), provider.id);
            }
            StoreOp::DeleteProvider(id) => {
                if let Some(removed) = self.providers.remove(id) {
                    self.provider_names.remove(&removed.name);
                }
            }
            StoreOp::SaveServiceArea(area) => {
                self.service_areas.put(area.id, area.clone());
            }
            StoreOp::DeleteServiceArea(id) => {
                self.service_areas.remove(id);
            }
        }
        self.operations_count += 1;
    }

    pub(super) fn batch(&mut self, ops: &[StoreOp]) {
        for op in ops {
            self.apply(op);
        }
    }

    pub(super) fn find_provider_by_id(&self, id: &Uuid) -> Option<Provider> {
        self.providers.get(id).cloned()
    }

    pub(super) fn find_provider_by_name(&self, name: &str) -> Option<Provider> {
        self.provider_names
            .get(name)
            .and_then(|id| self.providers.get(id))
            .cloned()
    }

    pub(super) fn list_providers(&self, offset: usize, limit: usize) -> Vec<Provider> {
        self.providers.page(offset, limit)
    }

    pub(super) fn provider_count(&self) -> usize {
        self.providers.len()
    }

    pub(super) fn find_service_area_by_id(&self, id: &Uuid) -> Option<ServiceArea> {
        self.service_areas.get(id).cloned()
    }

    pub(super) fn list_service_areas(&self, offset: usize, limit: usize) -> Vec<ServiceArea> {
        self.service_areas.page(offset, limit)
    }

    pub(super) fn service_area_count(&self) -> usize {
        self.service_areas.len()
    }

    pub(super) fn service_areas_by_provider(&self, provider: &Uuid) -> Vec<ServiceArea> {
        self.service_areas
            .iter()
            .filter(|area| area.provider == *provider)
            .cloned()
            .collect()
    }

    pub(super) fn stats(&self) -> StoreStats {
        StoreStats {
            providers: self.providers.len(),
            service_areas: self.service_areas.len(),
            operations_count: self.operations_count,
        }
    }
}

/// In-memory store using hash maps
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn find_provider_by_id(&self, id: &Uuid) -> Result<Option<Provider>> {
        Ok(self.state.read().find_provider_by_id(id))
    }

    fn find_provider_by_name(&self, name: &str) -> Result<Option<Provider>> {
        Ok(self.state.read().find_provider_by_name(name))
    }

    fn list_providers(&self, offset: usize, limit: usize) -> Result<Vec<Provider>> {
        Ok(self.state.read().list_providers(offset, limit))
    }

    fn provider_count(&self) -> Result<usize> {
        Ok(self.state.read().provider_count())
    }

    fn save_provider(&self, provider: &Provider) -> Result<()> {
        self.state
            .write()
            .apply(&StoreOp::SaveProvider(provider.clone()));
        Ok(())
    }

    fn delete_provider(&self, id: &Uuid) -> Result<Option<Provider>> {
        let mut state = self.state.write();
        let existing = state.find_provider_by_id(id);
        state.apply(&StoreOp::DeleteProvider(*id));
        Ok(existing)
    }

    fn find_service_area_by_id(&self, id: &Uuid) -> Result<Option<ServiceArea>> {
        Ok(self.state.read().find_service_area_by_id(id))
    }

    fn list_service_areas(&self, offset: usize, limit: usize) -> Result<Vec<ServiceArea>> {
        Ok(self.state.read().list_service_areas(offset, limit))
    }

    fn service_area_count(&self) -> Result<usize> {
        Ok(self.state.read().service_area_count())
    }

    fn service_areas_by_provider(&self, provider: &Uuid) -> Result<Vec<ServiceArea>> {
        Ok(self.state.read().service_areas_by_provider(provider))
    }

    fn save_service_area(&self, area: &ServiceArea) -> Result<()> {
        self.state
            .write()
            .apply(&StoreOp::SaveServiceArea(area.clone()));
        Ok(())
    }

    fn delete_service_area(&self, id: &Uuid) -> Result<Option<ServiceArea>> {
        let mut state = self.state.write();
        let existing = state.find_service_area_by_id(id);
        state.apply(&StoreOp::DeleteServiceArea(*id));
        Ok(existing)
    }

    fn load_all_service_areas(&self) -> Result<Vec<ServiceArea>> {
        Ok(self.state.read().service_areas().cloned().collect())
    }

    fn batch(&self, ops: &[StoreOp]) -> Result<()> {
        // In-memory operations cannot fail, so applying in order under one
        // write lock is atomic.
        self.state.write().batch(ops);
        Ok(())
    }

    fn stats(&self) -> Result<StoreStats> {
        Ok(self.state.read().stats())
    }
}
