//! Event payloads delivered by the user pool to its lifecycle hooks.
//!
//! Only the fields the hooks read or write are typed. Everything else is
//! carried through `extra` so a hook returns the event exactly as received
//! apart from the fields it sets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const PRE_SIGN_UP_SIGN_UP: &str = "PreSignUp_SignUp";
pub const PRE_SIGN_UP_EXTERNAL_PROVIDER: &str = "PreSignUp_ExternalProvider";
pub const POST_AUTHENTICATION: &str = "PostAuthentication_Authentication";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSignUpEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_pool_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default)]
    pub request: PreSignUpRequest,
    #[serde(default)]
    pub response: PreSignUpResponse,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSignUpRequest {
    #[serde(default)]
    pub user_attributes: HashMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Flags the hook hands back to the pool. The platform sends them as
/// `false` or `null` and reads whatever comes back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSignUpResponse {
    #[serde(default)]
    pub auto_confirm_user: Option<bool>,
    #[serde(default)]
    pub auto_verify_email: Option<bool>,
    #[serde(default)]
    pub auto_verify_phone: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PreSignUpResponse {
    pub fn confirms_user(&self) -> bool {
        self.auto_confirm_user.unwrap_or(false)
    }

    pub fn verifies_email(&self) -> bool {
        self.auto_verify_email.unwrap_or(false)
    }

    pub fn verifies_phone(&self) -> bool {
        self.auto_verify_phone.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthenticationEvent {
    pub user_pool_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_source: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PostAuthenticationEvent {
    pub fn new(user_pool_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_pool_id: user_pool_id.into(),
            user_name: user_name.into(),
            trigger_source: Some(POST_AUTHENTICATION.to_string()),
            extra: Map::new(),
        }
    }
}
