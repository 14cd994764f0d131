//! Identity provider credentials kept in the account-level API secret.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::{config::Region, Client as SecretsClient};
use identity_pool::models::FederatedProvider;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Secret holding every provider's OAuth client credentials as JSON.
pub const API_SECRETS_ID: &str = "/account/api/secrets";

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Invalid secret format: {0}")]
    InvalidFormat(String),

    #[error("Secret {secret_id} has no key {key}")]
    MissingKey { secret_id: String, key: String },

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),
}

/// A value stored under `json_key` of a JSON secret, resolved at deploy time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    pub secret_id: String,
    pub json_key: String,
}

impl SecretReference {
    pub fn client_id(provider: FederatedProvider) -> Self {
        Self::api_secret(format!("{}_CLIENT_ID", provider.as_str().to_uppercase()))
    }

    pub fn client_secret(provider: FederatedProvider) -> Self {
        Self::api_secret(format!("{}_CLIENT_SECRET", provider.as_str().to_uppercase()))
    }

    fn api_secret(json_key: String) -> Self {
        Self {
            secret_id: API_SECRETS_ID.to_string(),
            json_key,
        }
    }
}

#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn secret_string(&self, secret_id: &str) -> Result<SecretString, SecretError>;
}

pub struct SecretsManagerSource {
    client: SecretsClient,
}

impl SecretsManagerSource {
    pub fn new(client: SecretsClient) -> Self {
        Self { client }
    }

    pub async fn for_region(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(SecretsClient::new(&config))
    }
}

#[async_trait]
impl SecretSource for SecretsManagerSource {
    async fn secret_string(&self, secret_id: &str) -> Result<SecretString, SecretError> {
        let response = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_resource_not_found_exception() {
                    SecretError::NotFound(secret_id.to_string())
                } else {
                    tracing::error!(secret_id = %secret_id, error = %err, "GetSecretValue failed");
                    SecretError::AwsSdk(err.to_string())
                }
            })?;

        let value = response
            .secret_string()
            .ok_or_else(|| SecretError::InvalidFormat("Secret is binary, not string".to_string()))?;

        tracing::debug!(secret_id = %secret_id, version_id = ?response.version_id(), "Secret fetched");
        Ok(SecretString::new(value.to_string()))
    }
}

/// In-memory secrets, for local deployments and tests.
#[derive(Default)]
pub struct StaticSecretSource {
    secrets: HashMap<String, SecretString>,
}

impl StaticSecretSource {
    pub fn with_secret(mut self, secret_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets
            .insert(secret_id.into(), SecretString::new(value.into()));
        self
    }
}

#[async_trait]
impl SecretSource for StaticSecretSource {
    async fn secret_string(&self, secret_id: &str) -> Result<SecretString, SecretError> {
        self.secrets
            .get(secret_id)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(secret_id.to_string()))
    }
}

#[derive(Clone)]
pub struct ProviderCredentials {
    pub provider: FederatedProvider,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("provider", &self.provider)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Resolve the client id and secret of every federated provider.
pub async fn resolve_provider_credentials(
    source: &dyn SecretSource,
) -> Result<Vec<ProviderCredentials>, SecretError> {
    let raw = source.secret_string(API_SECRETS_ID).await?;
    let values: HashMap<String, String> = serde_json::from_str(raw.expose_secret())
        .map_err(|e| SecretError::InvalidFormat(format!("{}: {}", API_SECRETS_ID, e)))?;

    let lookup = |reference: SecretReference| {
        values
            .get(&reference.json_key)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or(SecretError::MissingKey {
                secret_id: reference.secret_id,
                key: reference.json_key,
            })
    };

    FederatedProvider::ALL
        .iter()
        .map(|&provider| -> Result<ProviderCredentials, SecretError> {
            Ok(ProviderCredentials {
                provider,
                client_id: lookup(SecretReference::client_id(provider))?,
                client_secret: SecretString::new(lookup(SecretReference::client_secret(
                    provider,
                ))?),
            })
        })
        .collect()
}
