//! External OAuth identity providers federated into the pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FederatedProvider {
    Facebook,
    Google,
}

impl FederatedProvider {
    pub const ALL: [FederatedProvider; 2] = [FederatedProvider::Facebook, FederatedProvider::Google];

    pub fn as_str(&self) -> &'static str {
        match self {
            FederatedProvider::Facebook => "Facebook",
            FederatedProvider::Google => "Google",
        }
    }

    /// OAuth scopes requested from the provider.
    pub fn scopes(&self) -> &'static [&'static str] {
        match self {
            FederatedProvider::Facebook => &["public_profile", "email"],
            FederatedProvider::Google => &["email"],
        }
    }

    /// Pool attribute name paired with the provider attribute it is copied from.
    pub fn attribute_mapping(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            FederatedProvider::Facebook => &[("email", "email")],
            FederatedProvider::Google => &[("email", "email"), ("email_verified", "email_verified")],
        }
    }

    /// Applies the mapping to a provider profile. Unmapped provider
    /// attributes are dropped.
    pub fn map_attributes(&self, profile: &HashMap<String, Value>) -> BTreeMap<String, String> {
        self.attribute_mapping()
            .iter()
            .filter_map(|(pool_attr, provider_attr)| {
                let value = match profile.get(*provider_attr)? {
                    Value::String(s) => s.clone(),
                    Value::Null => return None,
                    other => other.to_string(),
                };
                Some((pool_attr.to_string(), value))
            })
            .collect()
    }

    /// Username the pool assigns to an account created through this provider.
    pub fn username_for(&self, subject: &str) -> String {
        format!("{}_{}", self.as_str(), subject)
    }
}

impl std::fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FederatedProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "facebook" => Ok(FederatedProvider::Facebook),
            "google" => Ok(FederatedProvider::Google),
            _ => Err(format!("Unsupported identity provider: {}", s)),
        }
    }
}

/// Link between an account and a provider subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderIdentity {
    pub provider: FederatedProvider,
    pub subject: String,
    pub linked_at: DateTime<Utc>,
}

/// What a provider returned about the user after a successful OAuth exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderProfile {
    pub provider: FederatedProvider,
    pub subject: String,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}
