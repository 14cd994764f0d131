//! Auth SDK configuration derived from the published stacks record.

use serde::{Deserialize, Serialize};
use service_core::config::StacksConfig;
use service_core::error::AppError;
use std::path::Path;

/// Scopes requested from the hosted UI.
pub const OAUTH_SCOPES: [&str; 5] = [
    "phone",
    "email",
    "profile",
    "openid",
    "aws.cognito.signin.user.admin",
];

pub const RESPONSE_TYPE_CODE: &str = "code";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfiguration {
    #[serde(rename = "Auth")]
    pub auth: AuthConfig,
    #[serde(rename = "API")]
    pub api: ApiConfig,
    pub oauth: OAuthConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub region: String,
    pub user_pool_id: String,
    pub user_pool_web_client_id: String,
    pub identity_pool_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub endpoints: Vec<ApiEndpoint>,
}

/// How calls to an endpoint prove who is calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndpointAuthorization {
    /// Signed with the identity pool's credentials.
    SignedRequest,
    /// `Authorization: Bearer <access token>` from the current session.
    BearerToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub name: String,
    pub endpoint: String,
    pub region: String,
    pub authorization: EndpointAuthorization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthConfig {
    pub domain: String,
    pub scope: Vec<String>,
    pub redirect_sign_in: String,
    pub redirect_sign_out: String,
    pub response_type: String,
}

impl ClientConfiguration {
    pub fn from_stacks_config(record: &StacksConfig) -> Self {
        let endpoint = |name: &str, authorization| ApiEndpoint {
            name: name.to_string(),
            endpoint: record.api_endpoint.clone(),
            region: record.region.clone(),
            authorization,
        };

        Self {
            auth: AuthConfig {
                region: record.region.clone(),
                user_pool_id: record.user_pool_id.clone(),
                user_pool_web_client_id: record.user_pool_client_id.clone(),
                identity_pool_id: record.identity_pool_id.clone(),
            },
            api: ApiConfig {
                endpoints: vec![
                    endpoint(&record.api_name_iam, EndpointAuthorization::SignedRequest),
                    endpoint(&record.api_name_jwt, EndpointAuthorization::BearerToken),
                ],
            },
            oauth: OAuthConfig {
                domain: record.oauth_domain(),
                scope: OAUTH_SCOPES.iter().map(|s| s.to_string()).collect(),
                redirect_sign_in: record.redirect_sign_in.clone(),
                redirect_sign_out: record.redirect_sign_out.clone(),
                response_type: RESPONSE_TYPE_CODE.to_string(),
            },
        }
    }

    /// Read the record written for the frontend (`aws-config.json`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let record = StacksConfig::load_file(path)?;
        tracing::info!(
            user_pool_id = %record.user_pool_id,
            region = %record.region,
            api_endpoint = %record.api_endpoint,
            "Loaded stacks configuration"
        );
        Ok(Self::from_stacks_config(&record))
    }

    pub fn endpoint(&self, name: &str) -> Option<&ApiEndpoint> {
        self.api.endpoints.iter().find(|e| e.name == name)
    }
}
