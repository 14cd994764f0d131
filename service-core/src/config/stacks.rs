//! The account-level configuration record published after provisioning.
//!
//! The identity stack writes this record once its resources exist; the
//! frontend and any other stack read it back to discover pool ids, the API
//! endpoint and the OAuth redirect targets.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameter name the record is stored under.
pub const STACKS_CONFIG_PARAMETER: &str = "/account/stacks-config";

pub const API_NAME: &str = "TestAPI";
pub const API_NAME_IAM: &str = "TestAPIAuthorizeIAM";
pub const API_NAME_JWT: &str = "TestAPIAuthorizeJWT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StacksConfig {
    pub user_pool_id: String,
    pub user_pool_client_id: String,
    pub identity_pool_id: String,
    pub api_endpoint: String,
    pub region: String,
    pub domain_prefix: String,
    pub api_name: String,
    #[serde(rename = "apiNameIAM")]
    pub api_name_iam: String,
    #[serde(rename = "apiNameJWT")]
    pub api_name_jwt: String,
    pub redirect_sign_in: String,
    pub redirect_sign_out: String,
}

impl StacksConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid stacks configuration: {}", e))
        })
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|e| AppError::InternalError(anyhow::Error::new(e)))
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Failed to read stacks configuration from {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    /// Hosted UI domain of the user pool.
    pub fn oauth_domain(&self) -> String {
        format!("{}.auth.{}.amazoncognito.com", self.domain_prefix, self.region)
    }
}
