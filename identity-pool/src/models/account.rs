//! User pool accounts and the app client's attribute policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::provider::ProviderIdentity;

pub const EMAIL: &str = "email";
pub const EMAIL_VERIFIED: &str = "email_verified";
pub const PHONE_NUMBER: &str = "phone_number";
pub const PHONE_NUMBER_VERIFIED: &str = "phone_number_verified";

/// Attributes the app client may read.
pub const CLIENT_READ_ATTRIBUTES: &[&str] = &[EMAIL, EMAIL_VERIFIED, PHONE_NUMBER];

/// Attributes the app client may write. Verification flags are not among
/// them; only the hooks and admin calls set those.
pub const CLIENT_WRITE_ATTRIBUTES: &[&str] = &[EMAIL, PHONE_NUMBER];

pub fn is_client_readable(name: &str) -> bool {
    CLIENT_READ_ATTRIBUTES.contains(&name)
}

pub fn is_client_writable(name: &str) -> bool {
    CLIENT_WRITE_ATTRIBUTES.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Unconfirmed,
    Confirmed,
    ExternalProvider,
}

impl UserStatus {
    pub fn can_sign_in(self) -> bool {
        !matches!(self, UserStatus::Unconfirmed)
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub sub: String,
    pub status: UserStatus,
    pub attributes: BTreeMap<String, String>,
    pub password_hash: Option<String>,
    pub identities: Vec<ProviderIdentity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(username: impl Into<String>, status: UserStatus) -> Self {
        let now = Utc::now();
        Self {
            username: username.into(),
            sub: Uuid::new_v4().to_string(),
            status,
            attributes: BTreeMap::new(),
            password_hash: None,
            identities: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.attribute(EMAIL)
    }

    pub fn email_verified(&self) -> bool {
        self.attribute(EMAIL_VERIFIED) == Some("true")
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.attribute(PHONE_NUMBER)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
        self.updated_at = Utc::now();
    }

    /// What the app client is allowed to see of this account.
    pub fn view(&self) -> AccountView {
        AccountView {
            username: self.username.clone(),
            sub: self.sub.clone(),
            status: self.status,
            attributes: self
                .attributes
                .iter()
                .filter(|(name, _)| is_client_readable(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountView {
    pub username: String,
    pub sub: String,
    pub status: UserStatus,
    pub attributes: BTreeMap<String, String>,
}
