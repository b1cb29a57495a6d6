//! Configuration for the geofence service.
//!
//! The currency allow-list and field limits are owned here rather than in the
//! validation code so deployments can widen them without a rebuild.

use serde::de::Error;

/// Service configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Currency codes a provider may bill in.
    #[serde(default = "Config::default_allowed_currencies")]
    pub allowed_currencies: Vec<String>,

    /// Upper bound on the number of digits in a provider phone number.
    #[serde(default = "Config::default_phone_max_digits")]
    pub phone_max_digits: usize,

    /// Page size used when a listing request does not specify one.
    #[serde(default = "Config::default_page_size")]
    pub default_page_size: usize,

    /// Largest page size a listing request may ask for.
    #[serde(default = "Config::default_max_page_size")]
    pub max_page_size: usize,
}

impl Config {
    fn default_allowed_currencies() -> Vec<String> {
        vec!["USD".to_string(), "EUR".to_string()]
    }

    const fn default_phone_max_digits() -> usize {
        20
    }

    const fn default_page_size() -> usize {
        10
    }

    const fn default_max_page_size() -> usize {
        100
    }

    pub fn with_allowed_currencies<I, S>(mut self, currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_currencies = currencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_phone_max_digits(mut self, digits: usize) -> Self {
        assert!(digits > 0, "Phone digit limit must be greater than zero");
        self.phone_max_digits = digits;
        self
    }

    pub fn with_page_sizes(mut self, default_size: usize, max_size: usize) -> Self {
        assert!(
            default_size > 0 && default_size <= max_size,
            "Default page size must be in 1..=max_page_size"
        );
        self.default_page_size = default_size;
        self.max_page_size = max_size;
        self
    }

    pub fn is_currency_allowed(&self, code: &str) -> bool {
        self.allowed_currencies.iter().any(|c| c == code)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.allowed_currencies.is_empty() {
            return Err("At least one currency must be allowed".to_string());
        }

        if self.phone_max_digits == 0 {
            return Err("Phone digit limit must be greater than zero".to_string());
        }

        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(format!(
                "Default page size {} must be in 1..={}",
                self.default_page_size, self.max_page_size
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_currencies: Self::default_allowed_currencies(),
            phone_max_digits: Self::default_phone_max_digits(),
            default_page_size: Self::default_page_size(),
            max_page_size: Self::default_max_page_size(),
        }
    }
}
