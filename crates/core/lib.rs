//! Geodesic geofence: service areas, providers and point lookup.
//!
//! ## Features
//! - **Geodesic containment**: polygon edges are great-circle arcs, so areas
//!   near the poles or across the antimeridian behave like any other
//! - **Spatial indexing**: R*-tree over area bounding boxes, refined by the
//!   exact predicate
//! - **Consistency**: store and index change in lockstep; readers never see a
//!   half-applied update
//! - **Persistence**: pluggable [`Store`], with an atomically replaced snapshot
//!   file (`snapshot` feature)
//!
//! ```rust
//! use geofence::Geofence;
//! use geofence_types::{AreaGeometry, NewProvider};
//!
//! let geofence = Geofence::memory();
//! let provider = geofence.create_provider(NewProvider {
//!     name: "Acme".into(),
//!     email: "ops@acme.com".into(),
//!     phone_number: "5550100".into(),
//!     language: "en".into(),
//!     currency: "USD".into(),
//! })?;
//!
//! let ring = vec![[-49.30, -25.47], [-49.22, -25.47], [-49.22, -25.40], [-49.30, -25.40]];
//! geofence.register(provider.id, "Centro", 1500, AreaGeometry::Ring(ring))?;
//!
//! let hits = geofence.locate(-25.4394, -49.2581)?;
//! assert_eq!(hits[0].name, "Centro");
//! # Ok::<(), geofence::GeofenceError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod service;
pub mod storage;

pub use builder::GeofenceBuilder;
pub use config::Config;
pub use error::{GeofenceError, Result};
pub use service::{Geofence, GeofenceStats};

pub use compute::geometry::{GeoMultiPolygon, GeoPolygon, build_area, build_polygon};
pub use compute::validation;

#[cfg(feature = "snapshot")]
pub use storage::SnapshotStore;
pub use storage::{MemoryStore, Store, StoreOp, StoreStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    //! Commonly used items.
    pub use crate::{Config, Geofence, GeofenceBuilder, GeofenceError, Result};
    pub use geofence_types::{
        AreaGeometry, LocatedArea, NewProvider, Page, Provider, ProviderPatch, ServiceArea,
        ServiceAreaPatch,
    };
}
