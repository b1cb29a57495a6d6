//! The geofence service.
//!
//! [`Geofence`] owns the store and the live index and keeps them in step.
//! Every mutation runs the same sequence under a service-wide writer lock:
//! validate, persist, then update the index. A crash between the last two
//! steps can leave the index briefly behind the store (a stale read), never
//! ahead of it.
//!
//! Point lookups read only the index: every entry carries its provider's
//! name, which provider updates refresh under the same writer lock. A lookup
//! therefore never waits on a store write, however slow its persistence.

use crate::compute::geometry::build_area;
use crate::compute::spatial::AreaIndexStats;
use crate::compute::validation::{
    validate_geographic_point, validate_name, validate_page, validate_price, validate_provider,
};
use crate::config::Config;
use crate::error::{GeofenceError, Result};
use crate::storage::{MemoryStore, Store, StoreOp, StoreStats};
use geofence_types::area::{AreaGeometry, LocatedArea, ServiceArea, ServiceAreaPatch};
use geofence_types::page::Page;
use geofence_types::provider::{NewProvider, Provider, ProviderPatch};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

mod live_index;

pub use live_index::{IndexedServiceArea, LiveIndex};

/// Combined store and index statistics.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GeofenceStats {
    pub store: StoreStats,
    pub index: AreaIndexStats,
}

/// Provider and service-area directory with point lookup.
///
/// Cheap to clone; clones share state. Safe to use from many threads.
#[derive(Clone)]
pub struct Geofence {
    store: Arc<dyn Store>,
    index: Arc<LiveIndex>,
    writer: Arc<Mutex<()>>,
    config: Arc<Config>,
}

impl Geofence {
    /// Open a service over an existing store and rebuild the index from it.
    pub fn open(store: Box<dyn Store>, config: Config) -> Result<Self> {
        config.validate().map_err(GeofenceError::InvalidInput)?;

        let index = LiveIndex::new();
        index.rebuild(&store.load_all_service_areas()?, |id| {
            Ok(store.find_provider_by_id(id)?.map(|provider| provider.name))
        })?;

        Ok(Self {
            store: Arc::from(store),
            index: Arc::new(index),
            writer: Arc::new(Mutex::new(())),
            config: Arc::new(config),
        })
    }

    /// Empty in-memory service with default configuration.
    pub fn memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            index: Arc::new(LiveIndex::new()),
            writer: Arc::new(Mutex::new(())),
            config: Arc::new(Config::default()),
        }
    }

    pub fn builder() -> crate::builder::GeofenceBuilder {
        crate::builder::GeofenceBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ---- providers ----

    pub fn create_provider(&self, new: NewProvider) -> Result<Provider> {
        let provider = new.into_provider(Uuid::new_v4());
        validate_provider(&provider, &self.config)?;

        let _guard = self.writer.lock();
        self.ensure_unique_name(&provider)?;
        self.store.save_provider(&provider)?;

        log::debug!("Created provider {} ({})", provider.id, provider.name);
        Ok(provider)
    }

    pub fn get_provider(&self, id: &Uuid) -> Result<Provider> {
        self.store
            .find_provider_by_id(id)?
            .ok_or(GeofenceError::ProviderNotFound(*id))
    }

    /// One page of providers in creation order.
    pub fn list_providers(&self, page: usize, page_size: Option<usize>) -> Result<Page<Provider>> {
        let (offset, page_size) = validate_page(page, page_size, &self.config)?;
        let count = self.store.provider_count()?;
        check_page_exists(page, offset, count)?;

        Ok(Page {
            count,
            page,
            page_size,
            results: self.store.list_providers(offset, page_size)?,
        })
    }

    /// Apply a full or partial update. Unset patch fields keep their value.
    ///
    /// A rename is pushed to the index entries of the provider's service
    /// areas after the store accepted it.
    pub fn update_provider(&self, id: &Uuid, patch: ProviderPatch) -> Result<Provider> {
        let _guard = self.writer.lock();

        let current = self.get_provider(id)?;
        let updated = patch.apply(&current);
        validate_provider(&updated, &self.config)?;
        self.ensure_unique_name(&updated)?;

        self.store.save_provider(&updated)?;

        if updated.name != current.name {
            let owned: Vec<Uuid> = self
                .store
                .service_areas_by_provider(id)?
                .iter()
                .map(|area| area.id)
                .collect();
            let renamed = self.index.rename_provider(&owned, &updated.name);
            log::debug!(
                "Renamed provider {} to {} in {} index entries",
                id,
                updated.name,
                renamed
            );
        }

        Ok(updated)
    }

    /// Delete a provider together with every service area it owns.
    ///
    /// Index entries of the dependents are removed first, then the dependents
    /// and the provider are deleted in one store batch. If the batch fails the
    /// index entries are restored.
    pub fn delete_provider(&self, id: &Uuid) -> Result<()> {
        let _guard = self.writer.lock();

        if self.store.find_provider_by_id(id)?.is_none() {
            return Err(GeofenceError::ProviderNotFound(*id));
        }
        let dependents = self.store.service_areas_by_provider(id)?;

        let dependent_ids: Vec<Uuid> = dependents.iter().map(|area| area.id).collect();
        let removed = self.index.remove_many(&dependent_ids);
        if removed.len() != dependent_ids.len() {
            log::error!(
                "Provider {} owns {} service areas but only {} were indexed",
                id,
                dependent_ids.len(),
                removed.len()
            );
        }

        let mut ops: Vec<StoreOp> = dependent_ids
            .iter()
            .map(|area_id| StoreOp::DeleteServiceArea(*area_id))
            .collect();
        ops.push(StoreOp::DeleteProvider(*id));

        if let Err(e) = self.store.batch(&ops) {
            log::warn!("Cascade delete of provider {} failed, restoring index: {}", id, e);
            self.index.restore(removed);
            return Err(e);
        }

        log::info!(
            "Deleted provider {} and {} service areas",
            id,
            dependent_ids.len()
        );
        Ok(())
    }

    fn ensure_unique_name(&self, provider: &Provider) -> Result<()> {
        match self.store.find_provider_by_name(&provider.name)? {
            Some(existing) if existing.id != provider.id => {
                Err(GeofenceError::DuplicateProviderName(provider.name.clone()))
            }
            _ => Ok(()),
        }
    }

    // ---- service areas ----

    /// Validate, persist and index a new service area.
    ///
    /// # Errors
    ///
    /// - [`GeofenceError::Validation`] for a bad name or a negative price
    /// - [`GeofenceError::InvalidGeometry`] when the area cannot be built
    /// - [`GeofenceError::ProviderNotFound`] when the provider does not exist
    ///
    /// Nothing is stored or indexed when an error is returned.
    pub fn register(
        &self,
        provider: Uuid,
        name: &str,
        price: i64,
        area: AreaGeometry,
    ) -> Result<ServiceArea> {
        validate_name("name", name)?;
        let price = validate_price(price)?;
        let geometry = build_area(&area)?;

        let _guard = self.writer.lock();
        let owner = self.get_provider(&provider)?;

        let service_area = ServiceArea {
            id: Uuid::new_v4(),
            provider,
            name: name.to_string(),
            price,
            area,
        };

        self.store.save_service_area(&service_area)?;
        self.index.upsert(&service_area, &owner.name, geometry);

        log::debug!(
            "Registered service area {} for provider {}",
            service_area.id,
            provider
        );
        Ok(service_area)
    }

    pub fn get_service_area(&self, id: &Uuid) -> Result<ServiceArea> {
        self.store
            .find_service_area_by_id(id)?
            .ok_or(GeofenceError::ServiceAreaNotFound(*id))
    }

    /// One page of service areas in creation order.
    pub fn list_service_areas(
        &self,
        page: usize,
        page_size: Option<usize>,
    ) -> Result<Page<ServiceArea>> {
        let (offset, page_size) = validate_page(page, page_size, &self.config)?;
        let count = self.store.service_area_count()?;
        check_page_exists(page, offset, count)?;

        Ok(Page {
            count,
            page,
            page_size,
            results: self.store.list_service_areas(offset, page_size)?,
        })
    }

    /// Replace any of a service area's provider, name, price or area.
    ///
    /// The index entry is swapped in one write-lock acquisition after the store
    /// accepted the new version, so a lookup sees either the old or the new
    /// geometry and never both.
    pub fn relocate(&self, id: &Uuid, patch: ServiceAreaPatch) -> Result<ServiceArea> {
        let _guard = self.writer.lock();

        let current = self.get_service_area(id)?;

        let name = match patch.name {
            Some(name) => {
                validate_name("name", &name)?;
                name
            }
            None => current.name,
        };
        let price = match patch.price {
            Some(price) => validate_price(price)?,
            None => current.price,
        };
        let area = patch.area.unwrap_or(current.area);
        let geometry = build_area(&area)?;

        let provider = patch.provider.unwrap_or(current.provider);
        let owner = self.get_provider(&provider)?;

        if !self.index.contains(id) {
            log::error!("Service area {} is stored but not indexed", id);
            return Err(GeofenceError::IndexInconsistency(format!(
                "service area {} missing from index",
                id
            )));
        }

        let updated = ServiceArea {
            id: *id,
            provider,
            name,
            price,
            area,
        };

        self.store.save_service_area(&updated)?;
        self.index.upsert(&updated, &owner.name, geometry);
        Ok(updated)
    }

    /// Delete a service area. Unknown ids are a no-op.
    pub fn unregister(&self, id: &Uuid) -> Result<()> {
        let _guard = self.writer.lock();

        let stored = self.store.delete_service_area(id)?;
        let indexed = self.index.remove(id);

        if stored.is_some() && indexed.is_none() {
            log::warn!("Service area {} was stored but not indexed", id);
        }
        Ok(())
    }

    // ---- lookup ----

    /// Every service area containing the position, boundary included,
    /// ordered by name and then id.
    ///
    /// # Examples
    ///
    /// ```
    /// use geofence::Geofence;
    /// use geofence_types::{AreaGeometry, NewProvider};
    ///
    /// let geofence = Geofence::memory();
    /// let acme = geofence.create_provider(NewProvider {
    ///     name: "Acme".into(),
    ///     email: "ops@acme.com".into(),
    ///     phone_number: "5550100".into(),
    ///     language: "en".into(),
    ///     currency: "USD".into(),
    /// })?;
    ///
    /// let square = vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
    /// geofence.register(acme.id, "Zone1", 10_000, AreaGeometry::Ring(square))?;
    ///
    /// let hits = geofence.locate(0.5, 0.5)?;
    /// assert_eq!(hits.len(), 1);
    /// assert_eq!(hits[0].provider_name, "Acme");
    /// assert!(geofence.locate(2.0, 2.0)?.is_empty());
    /// # Ok::<(), geofence::GeofenceError>(())
    /// ```
    pub fn locate(&self, lat: f64, lng: f64) -> Result<Vec<LocatedArea>> {
        validate_geographic_point(lat, lng)?;

        let mut located: Vec<LocatedArea> = self
            .index
            .locate(lng, lat)
            .into_iter()
            .map(|(id, entry)| LocatedArea {
                id,
                name: entry.name,
                provider_name: entry.provider_name,
                price: entry.price,
            })
            .collect();

        located.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(located)
    }

    pub fn stats(&self) -> Result<GeofenceStats> {
        let store = self.store.stats()?;
        Ok(GeofenceStats {
            store,
            index: self.index.stats(),
        })
    }
}

/// Page 1 always exists, even for an empty listing.
fn check_page_exists(page: usize, offset: usize, count: usize) -> Result<()> {
    if page > 1 && offset >= count {
        return Err(GeofenceError::PageNotFound(page));
    }
    Ok(())
}
