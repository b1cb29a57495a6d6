//! Builder for opening a geofence service
//!
//! Chooses the store (in-memory, snapshot file or a caller-provided
//! implementation) and the configuration, then rebuilds the index from
//! whatever the store already holds.

use crate::config::Config;
use crate::error::Result;
use crate::service::Geofence;
use crate::storage::{MemoryStore, Store};
#[cfg(feature = "snapshot")]
use std::path::PathBuf;

enum StoreChoice {
    Memory,
    #[cfg(feature = "snapshot")]
    Snapshot(PathBuf),
    Custom(Box<dyn Store>),
}

/// Builder for service configuration and storage.
pub struct GeofenceBuilder {
    store: StoreChoice,
    config: Config,
}

impl GeofenceBuilder {
    /// Create a new builder with default in-memory configuration.
    pub fn new() -> Self {
        Self {
            store: StoreChoice::Memory,
            config: Config::default(),
        }
    }

    /// Persist to a snapshot file, loading it first if it exists.
    #[cfg(feature = "snapshot")]
    pub fn snapshot_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.store = StoreChoice::Snapshot(path.into());
        self
    }

    /// Configure for in-memory storage with no persistence.
    pub fn in_memory(mut self) -> Self {
        self.store = StoreChoice::Memory;
        self
    }

    /// Use a caller-provided store.
    pub fn store(mut self, store: Box<dyn Store>) -> Self {
        self.store = StoreChoice::Custom(store);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Open the store and rebuild the index from it.
    pub fn build(self) -> Result<Geofence> {
        let store: Box<dyn Store> = match self.store {
            StoreChoice::Memory => Box::new(MemoryStore::new()),
            #[cfg(feature = "snapshot")]
            StoreChoice::Snapshot(path) => Box::new(crate::storage::SnapshotStore::open(path)?),
            StoreChoice::Custom(store) => store,
        };
        Geofence::open(store, self.config)
    }
}

impl Default for GeofenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeofenceError;

    #[test]
    fn test_builder_in_memory() {
        let geofence = GeofenceBuilder::new().in_memory().build().unwrap();
        assert_eq!(geofence.stats().unwrap().index.areas, 0);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let mut config = Config::default();
        config.allowed_currencies.clear();
        assert!(matches!(
            GeofenceBuilder::new().config(config).build(),
            Err(GeofenceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_builder_with_config() {
        let config = Config::default().with_allowed_currencies(["BRL"]);
        let geofence = GeofenceBuilder::new().config(config).build().unwrap();
        assert!(geofence.config().is_currency_allowed("BRL"));
    }
}
