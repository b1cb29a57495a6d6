//! Axum handlers for the geofence REST API
//!
//! Point lookups read only the in-memory index and run inline. Everything
//! that touches the store may wait on locks or file I/O, so it runs on the
//! blocking thread pool.

use crate::error::{ApiError, ApiResult};
use crate::protocol::{LocateQuery, PageQuery, ProviderRequest, ServiceAreaRequest, parse_id};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use geofence::{Geofence, GeofenceStats};
use geofence_types::{LocatedArea, Page, Provider, ProviderPatch, ServiceArea, ServiceAreaPatch};

#[derive(Clone)]
pub struct AppState {
    pub geofence: Geofence,
}

impl AppState {
    pub fn new(geofence: Geofence) -> Self {
        Self { geofence }
    }
}

/// Run a service call on the blocking pool.
async fn blocking<T, F>(state: &AppState, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(Geofence) -> geofence::Result<T> + Send + 'static,
{
    let geofence = state.geofence.clone();
    tokio::task::spawn_blocking(move || f(geofence))
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn query<T>(payload: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    payload
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

// ---- providers ----

pub async fn create_provider(
    State(state): State<AppState>,
    payload: Result<Json<ProviderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Provider>)> {
    let new = body(payload)?.require_all()?;
    let provider = blocking(&state, move |g| g.create_provider(new)).await?;
    tracing::info!("Created provider {}", provider.id);
    Ok((StatusCode::CREATED, Json(provider)))
}

pub async fn list_providers(
    State(state): State<AppState>,
    params: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<Page<Provider>>> {
    let (page, page_size) = query(params)?.parse()?;
    let page = blocking(&state, move |g| g.list_providers(page, page_size)).await?;
    Ok(Json(page))
}

pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Provider>> {
    let id = parse_id(&id)?;
    let provider = blocking(&state, move |g| g.get_provider(&id)).await?;
    Ok(Json(provider))
}

pub async fn replace_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProviderRequest>, JsonRejection>,
) -> ApiResult<Json<Provider>> {
    let id = parse_id(&id)?;
    let patch: ProviderPatch = body(payload)?.require_all()?.into();
    let provider = blocking(&state, move |g| g.update_provider(&id, patch)).await?;
    Ok(Json(provider))
}

pub async fn patch_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ProviderRequest>, JsonRejection>,
) -> ApiResult<Json<Provider>> {
    let id = parse_id(&id)?;
    let patch = body(payload)?.into_patch();
    let provider = blocking(&state, move |g| g.update_provider(&id, patch)).await?;
    Ok(Json(provider))
}

pub async fn delete_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    blocking(&state, move |g| g.delete_provider(&id)).await?;
    tracing::info!("Deleted provider {}", id);
    Ok(StatusCode::NO_CONTENT)
}

// ---- service areas ----

pub async fn create_service_area(
    State(state): State<AppState>,
    payload: Result<Json<ServiceAreaRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ServiceArea>)> {
    let full = body(payload)?.require_all()?;
    let area = blocking(&state, move |g| {
        g.register(full.provider, &full.name, full.price, full.area)
    })
    .await?;
    tracing::info!("Registered service area {}", area.id);
    Ok((StatusCode::CREATED, Json(area)))
}

pub async fn list_service_areas(
    State(state): State<AppState>,
    params: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<Page<ServiceArea>>> {
    let (page, page_size) = query(params)?.parse()?;
    let page = blocking(&state, move |g| g.list_service_areas(page, page_size)).await?;
    Ok(Json(page))
}

pub async fn get_service_area(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ServiceArea>> {
    let id = parse_id(&id)?;
    let area = blocking(&state, move |g| g.get_service_area(&id)).await?;
    Ok(Json(area))
}

pub async fn replace_service_area(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ServiceAreaRequest>, JsonRejection>,
) -> ApiResult<Json<ServiceArea>> {
    let id = parse_id(&id)?;
    let patch: ServiceAreaPatch = body(payload)?.require_all()?.into();
    let area = blocking(&state, move |g| g.relocate(&id, patch)).await?;
    Ok(Json(area))
}

pub async fn patch_service_area(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ServiceAreaRequest>, JsonRejection>,
) -> ApiResult<Json<ServiceArea>> {
    let id = parse_id(&id)?;
    let patch = body(payload)?.into_patch();
    let area = blocking(&state, move |g| g.relocate(&id, patch)).await?;
    Ok(Json(area))
}

/// Always `204`, whether or not the area existed.
pub async fn delete_service_area(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let Ok(id) = parse_id(&id) else {
        return Ok(StatusCode::NO_CONTENT);
    };
    blocking(&state, move |g| g.unregister(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /service-areas/polygons?lat=&lng=`
pub async fn locate(
    State(state): State<AppState>,
    params: Result<Query<LocateQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<LocatedArea>>> {
    let (lat, lng) = query(params)?.parse()?;
    Ok(Json(state.geofence.locate(lat, lng)?))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<GeofenceStats>> {
    let stats = blocking(&state, |g| g.stats()).await?;
    Ok(Json(stats))
}
