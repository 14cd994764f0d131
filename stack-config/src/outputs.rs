use serde::{Deserialize, Serialize};
use service_core::config::stacks::{API_NAME, API_NAME_IAM, API_NAME_JWT};
use service_core::config::StacksConfig;
use validator::Validate;

use crate::settings::StackSettings;

/// Identifiers the platform assigns when the stack is deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentOutputs {
    #[validate(length(min = 1))]
    pub user_pool_id: String,
    #[validate(length(min = 1))]
    pub user_pool_client_id: String,
    #[validate(length(min = 1))]
    pub identity_pool_id: String,
    #[validate(url)]
    pub api_endpoint: String,
}

impl DeploymentOutputs {
    /// The record published for the frontend and other stacks. It is also
    /// what the stack reports as its outputs.
    pub fn stacks_config(&self, settings: &StackSettings) -> StacksConfig {
        StacksConfig {
            user_pool_id: self.user_pool_id.clone(),
            user_pool_client_id: self.user_pool_client_id.clone(),
            identity_pool_id: self.identity_pool_id.clone(),
            api_endpoint: self.api_endpoint.clone(),
            region: settings.region.clone(),
            domain_prefix: settings.domain_prefix.clone(),
            api_name: API_NAME.to_string(),
            api_name_iam: API_NAME_IAM.to_string(),
            api_name_jwt: API_NAME_JWT.to_string(),
            redirect_sign_in: settings.redirect_sign_in().to_string(),
            redirect_sign_out: settings.redirect_sign_out().to_string(),
        }
    }
}
