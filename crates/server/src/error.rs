//! Mapping from service errors to HTTP responses.
//!
//! Field problems come back as `400` with a body keyed by field name, e.g.
//! `{"name": ["This field is required."]}`. Other client errors carry a
//! `detail` message. Server-side failures are logged and answered with a
//! generic `500` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use geofence::GeofenceError;
use serde_json::{Map, Value, json};
use thiserror::Error;

pub const REQUIRED: &str = "This field is required.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Geofence(#[from] GeofenceError),

    /// Required fields absent from the request body or query.
    #[error("Missing fields: {0:?}")]
    MissingFields(Vec<&'static str>),

    /// A field is present but cannot be parsed.
    #[error("Invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

fn field_errors<'a>(fields: impl IntoIterator<Item = (&'a str, String)>) -> Value {
    let mut body = Map::new();
    for (field, message) in fields {
        body.insert(field.to_string(), json!([message]));
    }
    Value::Object(body)
}

fn detail(message: impl Into<String>) -> Value {
    json!({ "detail": message.into() })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Geofence(e) => match e {
                GeofenceError::Validation { field, message } => (
                    StatusCode::BAD_REQUEST,
                    field_errors([(field.as_str(), message)]),
                ),
                GeofenceError::DuplicateProviderName(_) => (
                    StatusCode::BAD_REQUEST,
                    field_errors([("name", "provider with this name already exists.".to_string())]),
                ),
                GeofenceError::InvalidGeometry(message) => {
                    (StatusCode::BAD_REQUEST, field_errors([("area", message)]))
                }
                GeofenceError::InvalidInput(message) => (StatusCode::BAD_REQUEST, detail(message)),
                e @ (GeofenceError::ProviderNotFound(_)
                | GeofenceError::ServiceAreaNotFound(_)
                | GeofenceError::PageNotFound(_)) => (StatusCode::NOT_FOUND, detail(e.to_string())),
                e => {
                    tracing::error!("Geofence error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        detail("Internal server error"),
                    )
                }
            },
            ApiError::MissingFields(fields) => (
                StatusCode::BAD_REQUEST,
                field_errors(fields.into_iter().map(|f| (f, REQUIRED.to_string()))),
            ),
            ApiError::InvalidField { field, message } => {
                (StatusCode::BAD_REQUEST, field_errors([(field, message)]))
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, detail(message)),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, detail(message)),
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    detail("Internal server error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
