use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A company offering services inside one or more service areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: Uuid,
    /// Display name, unique across providers.
    pub name: String,
    pub email: String,
    /// Digits only.
    pub phone_number: String,
    pub language: String,
    /// Currency code from the configured allow-list (e.g. `USD`).
    pub currency: String,
}

/// Fields required to create a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProvider {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub language: String,
    pub currency: String,
}

impl NewProvider {
    /// Materialize the provider under a fresh id.
    pub fn into_provider(self, id: Uuid) -> Provider {
        Provider {
            id,
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            language: self.language,
            currency: self.currency,
        }
    }
}

/// Partial provider update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl ProviderPatch {
    /// Apply the patch on top of an existing provider, keeping its id.
    pub fn apply(self, current: &Provider) -> Provider {
        Provider {
            id: current.id,
            name: self.name.unwrap_or_else(|| current.name.clone()),
            email: self.email.unwrap_or_else(|| current.email.clone()),
            phone_number: self
                .phone_number
                .unwrap_or_else(|| current.phone_number.clone()),
            language: self.language.unwrap_or_else(|| current.language.clone()),
            currency: self.currency.unwrap_or_else(|| current.currency.clone()),
        }
    }
}

impl From<NewProvider> for ProviderPatch {
    fn from(full: NewProvider) -> Self {
        Self {
            name: Some(full.name),
            email: Some(full.email),
            phone_number: Some(full.phone_number),
            language: Some(full.language),
            currency: Some(full.currency),
        }
    }
}
