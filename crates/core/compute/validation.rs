//! Validation for geographic coordinates and entity fields.

use crate::config::Config;
use crate::error::{GeofenceError, Result};
use geofence_types::provider::Provider;
use validator::ValidateEmail;

/// Longest accepted provider or service-area name.
pub const MAX_NAME_LEN: usize = 255;

/// Longest accepted language tag.
pub const MAX_LANGUAGE_LEN: usize = 50;

/// Checks that a `(lng, lat)` pair is finite and in range.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
pub fn check_lng_lat(lng: f64, lat: f64) -> std::result::Result<(), String> {
    if !lng.is_finite() {
        return Err(format!("Longitude must be finite, got: {}", lng));
    }

    if !lat.is_finite() {
        return Err(format!("Latitude must be finite, got: {}", lat));
    }

    if !(-180.0..=180.0).contains(&lng) {
        return Err(format!("Longitude out of range [-180.0, 180.0]: {}", lng));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Latitude out of range [-90.0, 90.0]: {}", lat));
    }

    Ok(())
}

/// Validates a query position.
///
/// # Examples
///
/// ```
/// use geofence::compute::validation::validate_geographic_point;
///
/// assert!(validate_geographic_point(-25.4394, -49.2581).is_ok());
/// assert!(validate_geographic_point(95.0, 0.0).is_err());
/// assert!(validate_geographic_point(0.0, f64::NAN).is_err());
/// ```
pub fn validate_geographic_point(lat: f64, lng: f64) -> Result<()> {
    check_lng_lat(lng, lat).map_err(GeofenceError::InvalidInput)
}

/// Validates every provider field against the configured limits.
pub fn validate_provider(provider: &Provider, config: &Config) -> Result<()> {
    validate_name("name", &provider.name)?;

    if !provider.email.validate_email() {
        return Err(GeofenceError::validation(
            "email",
            format!("'{}' is not a valid email address", provider.email),
        ));
    }

    let phone = &provider.phone_number;
    if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(GeofenceError::validation(
            "phone_number",
            "Phone number must contain only digits",
        ));
    }
    if phone.len() > config.phone_max_digits {
        return Err(GeofenceError::validation(
            "phone_number",
            format!(
                "Phone number must have at most {} digits",
                config.phone_max_digits
            ),
        ));
    }

    let language = provider.language.trim();
    if language.is_empty() || language.chars().count() > MAX_LANGUAGE_LEN {
        return Err(GeofenceError::validation(
            "language",
            format!("Language must have 1 to {} characters", MAX_LANGUAGE_LEN),
        ));
    }

    if !config.is_currency_allowed(&provider.currency) {
        return Err(GeofenceError::validation(
            "currency",
            format!(
                "Currency must be one of {:?}",
                config.allowed_currencies
            ),
        ));
    }

    Ok(())
}

/// Validates a provider or service-area name.
pub fn validate_name(field: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(GeofenceError::validation(field, "This field may not be blank"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(GeofenceError::validation(
            field,
            format!("Ensure this field has no more than {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(())
}

/// Validates a price in minor units and returns it unsigned.
///
/// # Examples
///
/// ```
/// use geofence::compute::validation::validate_price;
///
/// assert_eq!(validate_price(10_000).unwrap(), 10_000);
/// assert!(validate_price(-1).is_err());
/// ```
pub fn validate_price(price: i64) -> Result<u64> {
    u64::try_from(price)
        .map_err(|_| GeofenceError::validation("price", "Price must be a non-negative integer"))
}

/// Resolves a 1-based page request into `(offset, page_size)`.
pub fn validate_page(page: usize, page_size: Option<usize>, config: &Config) -> Result<(usize, usize)> {
    if page == 0 {
        return Err(GeofenceError::InvalidInput(
            "Page numbers start at 1".to_string(),
        ));
    }

    let page_size = page_size.unwrap_or(config.default_page_size);
    if page_size == 0 || page_size > config.max_page_size {
        return Err(GeofenceError::InvalidInput(format!(
            "Page size must be in 1..={}",
            config.max_page_size
        )));
    }

    let offset = (page - 1)
        .checked_mul(page_size)
        .ok_or(GeofenceError::PageNotFound(page))?;
    Ok((offset, page_size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geofence_types::provider::NewProvider;
    use uuid::Uuid;

    fn provider() -> Provider {
        NewProvider {
            name: "Provider 0".to_string(),
            email: "provider0@example.com".to_string(),
            phone_number: "999834410".to_string(),
            language: "en".to_string(),
            currency: "USD".to_string(),
        }
        .into_provider(Uuid::new_v4())
    }

    fn failing_field(provider: &Provider) -> String {
        match validate_provider(provider, &Config::default()) {
            Err(GeofenceError::Validation { field, .. }) => field,
            other => panic!("expected a field error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_coordinates() {
        assert!(check_lng_lat(-74.0060, 40.7128).is_ok());
        assert!(check_lng_lat(180.0, 0.0).is_ok());
        assert!(check_lng_lat(-180.0, 0.0).is_ok());
        assert!(check_lng_lat(0.0, 90.0).is_ok());
        assert!(check_lng_lat(0.0, -90.0).is_ok());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(check_lng_lat(180.1, 40.0).is_err());
        assert!(check_lng_lat(-200.0, 40.0).is_err());
        assert!(check_lng_lat(-74.0, 90.1).is_err());
        assert!(check_lng_lat(f64::INFINITY, 0.0).is_err());
        assert!(check_lng_lat(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_valid_provider() {
        assert!(validate_provider(&provider(), &Config::default()).is_ok());
    }

    #[test]
    fn test_provider_field_errors() {
        let mut p = provider();
        p.name = "   ".to_string();
        assert_eq!(failing_field(&p), "name");

        let mut p = provider();
        p.email = "not-an-email".to_string();
        assert_eq!(failing_field(&p), "email");

        let mut p = provider();
        p.phone_number = "+55 41 9999".to_string();
        assert_eq!(failing_field(&p), "phone_number");

        let mut p = provider();
        p.phone_number = "1".repeat(21);
        assert_eq!(failing_field(&p), "phone_number");

        let mut p = provider();
        p.language = String::new();
        assert_eq!(failing_field(&p), "language");

        let mut p = provider();
        p.currency = "BRL".to_string();
        assert_eq!(failing_field(&p), "currency");
    }

    #[test]
    fn test_currency_allow_list_is_configurable() {
        let mut p = provider();
        p.currency = "BRL".to_string();
        let config = Config::default().with_allowed_currencies(["BRL"]);
        assert!(validate_provider(&p, &config).is_ok());
    }

    #[test]
    fn test_name_length() {
        assert!(validate_name("name", &"x".repeat(255)).is_ok());
        assert!(validate_name("name", &"x".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_page() {
        let config = Config::default();
        assert_eq!(validate_page(1, None, &config).unwrap(), (0, 10));
        assert_eq!(validate_page(2, Some(5), &config).unwrap(), (5, 5));
        assert!(validate_page(0, None, &config).is_err());
        assert!(validate_page(1, Some(0), &config).is_err());
        assert!(validate_page(1, Some(101), &config).is_err());
    }
}
