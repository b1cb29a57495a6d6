//! Request and query types of the REST API.
//!
//! Bodies are deserialized with every field optional so a missing field can
//! be reported by name instead of failing the whole body.

use crate::error::{ApiError, ApiResult};
use geofence_types::{AreaGeometry, NewProvider, ProviderPatch, ServiceAreaPatch};
use serde::Deserialize;
use uuid::Uuid;

/// Body of provider create, replace and partial update requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub language: Option<String>,
    pub currency: Option<String>,
}

impl ProviderRequest {
    /// All fields, for create and full replace.
    pub fn require_all(self) -> ApiResult<NewProvider> {
        let mut missing = Vec::new();
        note_missing(&mut missing, "name", &self.name);
        note_missing(&mut missing, "email", &self.email);
        note_missing(&mut missing, "phone_number", &self.phone_number);
        note_missing(&mut missing, "language", &self.language);
        note_missing(&mut missing, "currency", &self.currency);

        match self {
            ProviderRequest {
                name: Some(name),
                email: Some(email),
                phone_number: Some(phone_number),
                language: Some(language),
                currency: Some(currency),
            } => Ok(NewProvider {
                name,
                email,
                phone_number,
                language,
                currency,
            }),
            _ => Err(ApiError::MissingFields(missing)),
        }
    }

    pub fn into_patch(self) -> ProviderPatch {
        ProviderPatch {
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            language: self.language,
            currency: self.currency,
        }
    }
}

/// Body of service-area create, replace and partial update requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceAreaRequest {
    pub provider: Option<Uuid>,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub area: Option<AreaGeometry>,
}

/// Service-area fields once all of them are known to be present.
#[derive(Debug, Clone)]
pub struct CompleteServiceArea {
    pub provider: Uuid,
    pub name: String,
    pub price: i64,
    pub area: AreaGeometry,
}

impl ServiceAreaRequest {
    pub fn require_all(self) -> ApiResult<CompleteServiceArea> {
        let mut missing = Vec::new();
        note_missing(&mut missing, "provider", &self.provider);
        note_missing(&mut missing, "name", &self.name);
        note_missing(&mut missing, "price", &self.price);
        note_missing(&mut missing, "area", &self.area);

        match self {
            ServiceAreaRequest {
                provider: Some(provider),
                name: Some(name),
                price: Some(price),
                area: Some(area),
            } => Ok(CompleteServiceArea {
                provider,
                name,
                price,
                area,
            }),
            _ => Err(ApiError::MissingFields(missing)),
        }
    }

    pub fn into_patch(self) -> ServiceAreaPatch {
        ServiceAreaPatch {
            provider: self.provider,
            name: self.name,
            price: self.price,
            area: self.area,
        }
    }
}

impl From<CompleteServiceArea> for ServiceAreaPatch {
    fn from(full: CompleteServiceArea) -> Self {
        Self {
            provider: Some(full.provider),
            name: Some(full.name),
            price: Some(full.price),
            area: Some(full.area),
        }
    }
}

fn note_missing<T>(missing: &mut Vec<&'static str>, field: &'static str, value: &Option<T>) {
    if value.is_none() {
        missing.push(field);
    }
}

/// `?page=&page_size=` of listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    /// `(page, page_size)`; page defaults to 1.
    pub fn parse(&self) -> ApiResult<(usize, Option<usize>)> {
        let page = match &self.page {
            Some(raw) => parse_field::<usize>("page", raw)?,
            None => 1,
        };
        let page_size = self
            .page_size
            .as_deref()
            .map(|raw| parse_field::<usize>("page_size", raw))
            .transpose()?;
        Ok((page, page_size))
    }
}

/// `?lat=&lng=` of the point lookup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocateQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl LocateQuery {
    /// `(lat, lng)` as numbers. Range checks are left to the service.
    pub fn parse(&self) -> ApiResult<(f64, f64)> {
        match (&self.lat, &self.lng) {
            (Some(lat), Some(lng)) => Ok((parse_field("lat", lat)?, parse_field("lng", lng)?)),
            (lat, lng) => {
                let mut missing = Vec::new();
                note_missing(&mut missing, "lat", lat);
                note_missing(&mut missing, "lng", lng);
                Err(ApiError::MissingFields(missing))
            }
        }
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, raw: &str) -> ApiResult<T> {
    raw.trim().parse().map_err(|_| ApiError::InvalidField {
        field,
        message: format!("'{}' is not a valid number", raw),
    })
}

/// Path ids that are not UUIDs name no resource.
pub fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("No resource with id '{}'", raw)))
}
