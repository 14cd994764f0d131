//! Administrative user pool calls made on behalf of the hooks.

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::{
    config::Region,
    types::AttributeType,
    Client,
};
use thiserror::Error;

/// Environment variable the deployed hook reads its region from.
pub const REGION_ENV: &str = "region";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAttribute {
    pub name: String,
    pub value: String,
}

impl UserAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("user pool {0} does not exist")]
    PoolNotFound(String),

    #[error("user {0} does not exist")]
    UserNotFound(String),

    #[error("admin request failed: {0}")]
    Service(String),
}

/// Privileged attribute updates that bypass the app client's write policy.
#[async_trait]
pub trait UserPoolAdmin: Send + Sync {
    async fn admin_update_user_attributes(
        &self,
        user_pool_id: &str,
        username: &str,
        attributes: &[UserAttribute],
    ) -> Result<(), AdminError>;
}

#[derive(Clone, Debug)]
pub struct CognitoUserPoolAdmin {
    client: Client,
}

impl CognitoUserPoolAdmin {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the default credential chain, pinned to the
    /// region named by [`REGION_ENV`] when it is set.
    pub async fn from_env() -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Ok(region) = std::env::var(REGION_ENV) {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl UserPoolAdmin for CognitoUserPoolAdmin {
    async fn admin_update_user_attributes(
        &self,
        user_pool_id: &str,
        username: &str,
        attributes: &[UserAttribute],
    ) -> Result<(), AdminError> {
        let user_attributes = attributes
            .iter()
            .map(|attr| {
                AttributeType::builder()
                    .name(&attr.name)
                    .value(&attr.value)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AdminError::Service(e.to_string()))?;

        self.client
            .admin_update_user_attributes()
            .user_pool_id(user_pool_id)
            .username(username)
            .set_user_attributes(Some(user_attributes))
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_user_not_found_exception() {
                    AdminError::UserNotFound(username.to_string())
                } else if err.is_resource_not_found_exception() {
                    AdminError::PoolNotFound(user_pool_id.to_string())
                } else {
                    tracing::error!(
                        user_pool_id = %user_pool_id,
                        username = %username,
                        error = %err,
                        "AdminUpdateUserAttributes failed"
                    );
                    AdminError::Service(err.to_string())
                }
            })?;

        Ok(())
    }
}
