//! HTTP/REST transport for the geofence server
//!
//! Endpoints:
//! - `POST   /providers`                  create a provider
//! - `GET    /providers`                  list providers (`page`, `page_size`)
//! - `GET    /providers/:id`              fetch a provider
//! - `PUT    /providers/:id`              replace a provider
//! - `PATCH  /providers/:id`              update some provider fields
//! - `DELETE /providers/:id`              delete a provider and its areas
//! - `POST   /service-areas`              register a service area
//! - `GET    /service-areas`              list service areas
//! - `GET    /service-areas/polygons`     areas containing `lat`/`lng`
//! - `GET    /service-areas/:id`          fetch a service area
//! - `PUT    /service-areas/:id`          replace a service area
//! - `PATCH  /service-areas/:id`          update some service-area fields
//! - `DELETE /service-areas/:id`          delete a service area
//! - `GET    /stats`                      store and index statistics

use crate::handler::{self, AppState};
use axum::Router;
use axum::routing::get;
use geofence::Geofence;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the API router around a service.
pub fn router(geofence: Geofence) -> Router {
    Router::new()
        .route(
            "/providers",
            get(handler::list_providers).post(handler::create_provider),
        )
        .route(
            "/providers/:id",
            get(handler::get_provider)
                .put(handler::replace_provider)
                .patch(handler::patch_provider)
                .delete(handler::delete_provider),
        )
        .route(
            "/service-areas",
            get(handler::list_service_areas).post(handler::create_service_area),
        )
        .route("/service-areas/polygons", get(handler::locate))
        .route(
            "/service-areas/:id",
            get(handler::get_service_area)
                .put(handler::replace_service_area)
                .patch(handler::patch_service_area)
                .delete(handler::delete_service_area),
        )
        .route("/stats", get(handler::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(geofence))
}

/// Serve the API until `shutdown` resolves.
///
/// # Errors
/// Returns an error if the listener fails.
pub async fn run_server(
    listener: TcpListener,
    geofence: Geofence,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("Geofence HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(geofence))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Geofence HTTP server stopped");
    Ok(())
}
