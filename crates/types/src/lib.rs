//! # geofence-types
//!
//! Data types shared by the geofence core and its transports.
//!
//! - **Providers**: `Provider`, `NewProvider`, `ProviderPatch`
//! - **Service areas**: `ServiceArea`, `ServiceAreaPatch`, `AreaGeometry`
//! - **Query results**: `LocatedArea`, `Page`
//!
//! All types are serializable with Serde. Coordinates are always
//! `[longitude, latitude]` pairs.
//!
//! ```rust
//! use geofence_types::area::AreaGeometry;
//!
//! let area: AreaGeometry =
//!     serde_json::from_str("[[0,0],[0,1],[1,1],[1,0],[0,0]]").unwrap();
//! assert_eq!(area.polygons().len(), 1);
//! ```

pub mod area;
pub mod page;
pub mod provider;

pub use area::{AreaGeometry, LocatedArea, RawRing, ServiceArea, ServiceAreaPatch};
pub use page::Page;
pub use provider::{NewProvider, Provider, ProviderPatch};
