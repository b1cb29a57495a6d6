//! Transport layer for the geofence server
//!
//! Available transports:
//! - `http` - REST API over axum

pub mod http;
