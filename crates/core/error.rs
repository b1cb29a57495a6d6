//! Error types for the geofence core.

use thiserror::Error;
use uuid::Uuid;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeofenceError>;

#[derive(Debug, Error)]
pub enum GeofenceError {
    /// Malformed ring, too few points, or out-of-range coordinates.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Malformed request parameter that is not tied to a stored field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A single field failed validation.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Provider name already taken: {0}")]
    DuplicateProviderName(String),

    #[error("Provider not found: {0}")]
    ProviderNotFound(Uuid),

    #[error("Service area not found: {0}")]
    ServiceAreaNotFound(Uuid),

    #[error("Page {0} does not exist")]
    PageNotFound(usize),

    /// Index and store disagree. Always a defect.
    #[error("Index inconsistency: {0}")]
    IndexInconsistency(String),

    /// Opaque failure reported by the persistence collaborator.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GeofenceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidGeometry(_)
                | Self::InvalidInput(_)
                | Self::Validation { .. }
                | Self::DuplicateProviderName(_)
                | Self::ProviderNotFound(_)
                | Self::ServiceAreaNotFound(_)
                | Self::PageNotFound(_)
        )
    }
}
