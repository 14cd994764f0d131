//! api-gateway: enforces the per-route trust mechanism in front of the
//! private route handlers.
pub mod config;
pub mod handlers;
pub mod routes;
pub mod startup;

use async_trait::async_trait;
use secrecy::SecretString;
use service_core::auth::{CredentialStore, TokenValidator};
use service_core::error::AppError;
use service_core::middleware::SignedRequestConfig;
use std::sync::Arc;

pub use startup::{build_router, Application};

#[derive(Clone)]
pub struct GatewayState {
    pub service_name: String,
    pub allowed_origins: Vec<String>,
    pub signing: SignedRequestConfig,
    pub credentials: Arc<dyn CredentialStore>,
    pub validator: TokenValidator,
}

impl AsRef<SignedRequestConfig> for GatewayState {
    fn as_ref(&self) -> &SignedRequestConfig {
        &self.signing
    }
}

impl AsRef<TokenValidator> for GatewayState {
    fn as_ref(&self) -> &TokenValidator {
        &self.validator
    }
}

#[async_trait]
impl CredentialStore for GatewayState {
    async fn signing_secret(&self, access_key_id: &str) -> Result<Option<SecretString>, AppError> {
        self.credentials.signing_secret(access_key_id).await
    }

    async fn claim_nonce(&self, nonce: &str, ttl_secs: i64) -> Result<bool, AppError> {
        self.credentials.claim_nonce(nonce, ttl_secs).await
    }
}
