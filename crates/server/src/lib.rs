//! Geofence Server
//!
//! REST front end for the geofence service-area directory.
//!
//! # Example
//!
//! ```ignore
//! use geofence_server::run_server;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! run_server(listener, geofence, shutdown).await?;
//! ```

pub mod error;
pub mod handler;
pub mod protocol;
pub mod transport;

pub use error::{ApiError, ApiResult};
pub use transport::http::{router, run_server};
