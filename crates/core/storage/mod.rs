//! Persistence collaborator for the geofence service.
//!
//! The service owns validation and the spatial index; a [`Store`] only keeps
//! providers and service areas and applies batches atomically. Listing order
//! is insertion order and survives updates.
//!
//! Stores are shared between threads and do their own locking. Writes are
//! serialized by the service, so an implementation only has to keep reads
//! from blocking on slow writes.

use crate::error::Result;
use geofence_types::area::ServiceArea;
use geofence_types::provider::Provider;
use uuid::Uuid;

mod memory;
#[cfg(feature = "snapshot")]
mod snapshot;

pub use memory::MemoryStore;
#[cfg(feature = "snapshot")]
pub use snapshot::SnapshotStore;

/// Trait for store implementations
///
/// Reads must not wait for a write that is still persisting.
pub trait Store: Send + Sync {
    fn find_provider_by_id(&self, id: &Uuid) -> Result<Option<Provider>>;

    fn find_provider_by_name(&self, name: &str) -> Result<Option<Provider>>;

    /// Providers in insertion order, starting at `offset`.
    fn list_providers(&self, offset: usize, limit: usize) -> Result<Vec<Provider>>;

    fn provider_count(&self) -> Result<usize>;

    /// Insert or replace a provider.
    fn save_provider(&self, provider: &Provider) -> Result<()>;

    /// Delete a provider and return it if it existed. Does not cascade.
    fn delete_provider(&self, id: &Uuid) -> Result<Option<Provider>>;

    fn find_service_area_by_id(&self, id: &Uuid) -> Result<Option<ServiceArea>>;

    /// Service areas in insertion order, starting at `offset`.
    fn list_service_areas(&self, offset: usize, limit: usize) -> Result<Vec<ServiceArea>>;

    fn service_area_count(&self) -> Result<usize>;

    /// Every service area owned by a provider, in insertion order.
    fn service_areas_by_provider(&self, provider: &Uuid) -> Result<Vec<ServiceArea>>;

    /// Insert or replace a service area.
    fn save_service_area(&self, area: &ServiceArea) -> Result<()>;

    fn delete_service_area(&self, id: &Uuid) -> Result<Option<ServiceArea>>;

    /// Every service area, used to rebuild the index at startup.
    fn load_all_service_areas(&self) -> Result<Vec<ServiceArea>>;

    /// Apply all operations or none of them.
    fn batch(&self, ops: &[StoreOp]) -> Result<()>;

    fn stats(&self) -> Result<StoreStats>;
}

/// Store operation for batch processing
#[derive(Debug, Clone)]
pub enum StoreOp {
    SaveProvider(Provider),
    DeleteProvider(Uuid),
    SaveServiceArea(ServiceArea),
    DeleteServiceArea(Uuid),
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    /// Number of stored providers
    pub providers: usize,
    /// Number of stored service areas
    pub service_areas: usize,
    /// Number of write operations applied since open
    pub operations_count: u64,
}
