//! In-process user pool used in local mode and tests.
//!
//! Sign-up runs the pre sign-up hook before the account is stored. Login
//! runs the post authentication hook before any token is issued, and a hook
//! failure fails the login.

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Map};
use std::sync::Arc;
use validator::Validate;

use super::admin::{AdminError, UserAttribute, UserPoolAdmin};
use super::error::PoolError;
use super::issuer::TokenIssuer;
use crate::models::account::{
    is_client_writable, Account, AccountView, UserStatus, EMAIL, EMAIL_VERIFIED, PHONE_NUMBER,
    PHONE_NUMBER_VERIFIED,
};
use crate::models::provider::{FederatedProvider, ProviderIdentity, ProviderProfile};
use crate::models::session::SessionTokens;
use crate::triggers::events::{
    PreSignUpRequest, PreSignUpResponse, PRE_SIGN_UP_EXTERNAL_PROVIDER, PRE_SIGN_UP_SIGN_UP,
};
use crate::triggers::{handle_post_authentication, handle_pre_signup};
use crate::triggers::{PostAuthenticationEvent, PreSignUpEvent};
use crate::utils::password::{hash_password, verify_password};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(length(min = 1, max = 128))]
    pub username: String,
    pub password: SecretString,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 4, max = 32))]
    pub phone_number: Option<String>,
}

#[derive(Clone)]
pub struct LocalUserPool {
    user_pool_id: String,
    issuer: TokenIssuer,
    accounts: Arc<DashMap<String, Account>>,
    provider_links: Arc<DashMap<(FederatedProvider, String), String>>,
    post_auth_admin: Option<Arc<dyn UserPoolAdmin>>,
}

impl LocalUserPool {
    pub fn new(user_pool_id: impl Into<String>, issuer: TokenIssuer) -> Self {
        Self {
            user_pool_id: user_pool_id.into(),
            issuer,
            accounts: Arc::new(DashMap::new()),
            provider_links: Arc::new(DashMap::new()),
            post_auth_admin: None,
        }
    }

    /// Route the post authentication hook's admin call somewhere other than
    /// this pool.
    pub fn with_post_authentication_admin(mut self, admin: Arc<dyn UserPoolAdmin>) -> Self {
        self.post_auth_admin = Some(admin);
        self
    }

    pub fn user_pool_id(&self) -> &str {
        &self.user_pool_id
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub async fn sign_up(&self, request: SignUpRequest) -> Result<AccountView, PoolError> {
        if request.password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(PoolError::InvalidPassword);
        }
        if let Some(email) = request.email.as_deref() {
            if self.find_by_email(email).is_some() {
                return Err(PoolError::AliasExists(EMAIL));
            }
        }

        let mut account = Account::new(&request.username, UserStatus::Unconfirmed);
        if let Some(email) = request.email {
            account.set_attribute(EMAIL, email);
        }
        if let Some(phone) = request.phone_number {
            account.set_attribute(PHONE_NUMBER, phone);
        }

        let response = self.run_pre_sign_up(PRE_SIGN_UP_SIGN_UP, &account);
        if response.confirms_user() {
            account.status = UserStatus::Confirmed;
        }
        apply_verification(&mut account, &response);

        account.password_hash = Some(hash_password(&request.password)?);

        match self.accounts.entry(request.username) {
            Entry::Occupied(_) => Err(PoolError::UsernameExists),
            Entry::Vacant(slot) => {
                tracing::info!(
                    user_pool_id = %self.user_pool_id,
                    username = %account.username,
                    status = ?account.status,
                    "Account created"
                );
                Ok(slot.insert(account).view())
            }
        }
    }

    /// Password login by username or email alias.
    pub async fn authenticate(
        &self,
        login: &str,
        password: &SecretString,
    ) -> Result<SessionTokens, PoolError> {
        let account = self.resolve_login(login).ok_or(PoolError::NotAuthorized)?;

        let password_hash = account
            .password_hash
            .as_deref()
            .ok_or(PoolError::NotAuthorized)?;
        verify_password(password, password_hash).map_err(|_| PoolError::NotAuthorized)?;

        if !account.status.can_sign_in() {
            return Err(PoolError::UserNotConfirmed);
        }

        self.complete_login(&account.username).await
    }

    /// Sign in with a profile returned by an external provider, creating and
    /// linking the account on first use.
    pub async fn federated_sign_in(
        &self,
        profile: ProviderProfile,
    ) -> Result<SessionTokens, PoolError> {
        let mapped = profile.provider.map_attributes(&profile.attributes);
        let link_key = (profile.provider, profile.subject.clone());

        let linked = self.provider_links.get(&link_key).map(|u| u.value().clone());
        let username = match linked {
            Some(username) => {
                let mut account = self
                    .accounts
                    .get_mut(&username)
                    .ok_or(PoolError::UserNotFound)?;
                for (name, value) in mapped {
                    account.set_attribute(name, value);
                }
                username
            }
            None => {
                let username = profile.provider.username_for(&profile.subject);
                let mut account = Account::new(&username, UserStatus::ExternalProvider);
                account.attributes = mapped;
                account.identities.push(ProviderIdentity {
                    provider: profile.provider,
                    subject: profile.subject.clone(),
                    linked_at: chrono::Utc::now(),
                });

                let response = self.run_pre_sign_up(PRE_SIGN_UP_EXTERNAL_PROVIDER, &account);
                apply_verification(&mut account, &response);

                self.accounts.insert(username.clone(), account);
                self.provider_links.insert(link_key, username.clone());
                tracing::info!(
                    provider = %profile.provider,
                    username = %username,
                    "Linked federated identity"
                );
                username
            }
        };

        self.complete_login(&username).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<SessionTokens, PoolError> {
        let claims = self
            .issuer
            .verify_refresh_token(refresh_token)
            .map_err(|_| PoolError::InvalidToken)?;

        let account = self
            .accounts
            .get(&claims.username)
            .map(|a| a.value().clone())
            .filter(|a| a.sub == claims.sub)
            .ok_or(PoolError::NotAuthorized)?;

        Ok(self
            .issuer
            .issue_with_refresh(&account, refresh_token.to_string())?)
    }

    /// The caller's own account, filtered by the client's read policy.
    pub async fn get_user(&self, access_token: &str) -> Result<AccountView, PoolError> {
        let username = self.username_from_access_token(access_token)?;
        self.accounts
            .get(&username)
            .map(|a| a.view())
            .ok_or(PoolError::UserNotFound)
    }

    /// Self-service attribute update, bound by the client's write policy.
    /// Changing email or phone clears the matching verification flag.
    pub async fn update_user_attributes(
        &self,
        access_token: &str,
        attributes: &[UserAttribute],
    ) -> Result<AccountView, PoolError> {
        let username = self.username_from_access_token(access_token)?;

        if let Some(denied) = attributes.iter().find(|a| !is_client_writable(&a.name)) {
            return Err(PoolError::AttributeNotWritable(denied.name.clone()));
        }
        if let Some(email) = attributes.iter().find(|a| a.name == EMAIL) {
            if let Some(owner) = self.find_by_email(&email.value) {
                if owner.username != username {
                    return Err(PoolError::AliasExists(EMAIL));
                }
            }
        }

        let mut account = self
            .accounts
            .get_mut(&username)
            .ok_or(PoolError::UserNotFound)?;

        for attr in attributes {
            let changed = account.attribute(&attr.name) != Some(attr.value.as_str());
            account.set_attribute(&attr.name, &attr.value);
            if changed {
                match attr.name.as_str() {
                    EMAIL => account.set_attribute(EMAIL_VERIFIED, "false"),
                    PHONE_NUMBER => account.set_attribute(PHONE_NUMBER_VERIFIED, "false"),
                    _ => {}
                }
            }
        }

        Ok(account.view())
    }

    pub fn admin_get_user(&self, username: &str) -> Result<Account, PoolError> {
        self.accounts
            .get(username)
            .map(|a| a.value().clone())
            .ok_or(PoolError::UserNotFound)
    }

    async fn complete_login(&self, username: &str) -> Result<SessionTokens, PoolError> {
        let account = self.admin_get_user(username)?;
        self.run_post_authentication(&account).await?;

        // Re-read so the tokens reflect what the hook wrote.
        let account = self.admin_get_user(username)?;
        let tokens = self.issuer.issue(&account)?;

        tracing::info!(
            user_pool_id = %self.user_pool_id,
            username = %username,
            "Login succeeded"
        );
        Ok(tokens)
    }

    fn run_pre_sign_up(&self, trigger_source: &str, account: &Account) -> PreSignUpResponse {
        let event = PreSignUpEvent {
            trigger_source: Some(trigger_source.to_string()),
            user_pool_id: Some(self.user_pool_id.clone()),
            user_name: Some(account.username.clone()),
            request: PreSignUpRequest {
                user_attributes: account.attributes.clone().into_iter().collect(),
                extra: Map::new(),
            },
            response: PreSignUpResponse::default(),
            extra: Map::new(),
        };
        handle_pre_signup(event).response
    }

    async fn run_post_authentication(&self, account: &Account) -> Result<(), PoolError> {
        let mut event = PostAuthenticationEvent::new(&self.user_pool_id, &account.username);
        event.extra.insert(
            "request".to_string(),
            json!({ "userAttributes": account.attributes, "newDeviceUsed": false }),
        );

        let result = match &self.post_auth_admin {
            Some(admin) => handle_post_authentication(admin.as_ref(), event).await,
            None => handle_post_authentication(self, event).await,
        };

        result.map(|_| ()).map_err(|e| {
            tracing::warn!(
                username = %account.username,
                error = %e,
                "Post authentication hook failed, rejecting login"
            );
            PoolError::from(e)
        })
    }

    fn username_from_access_token(&self, access_token: &str) -> Result<String, PoolError> {
        let claims = self
            .issuer
            .verify_access_token(access_token)
            .map_err(|_| PoolError::InvalidToken)?;
        claims
            .username()
            .map(str::to_string)
            .ok_or(PoolError::InvalidToken)
    }

    fn resolve_login(&self, login: &str) -> Option<Account> {
        self.accounts
            .get(login)
            .map(|a| a.value().clone())
            .or_else(|| self.find_by_email(login))
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        self.accounts
            .iter()
            .find(|a| a.email().is_some_and(|e| e.eq_ignore_ascii_case(email)))
            .map(|a| a.value().clone())
    }
}

fn apply_verification(account: &mut Account, response: &PreSignUpResponse) {
    if response.verifies_email() && account.email().is_some() {
        account.set_attribute(EMAIL_VERIFIED, "true");
    }
    if response.verifies_phone() && account.phone_number().is_some() {
        account.set_attribute(PHONE_NUMBER_VERIFIED, "true");
    }
}

#[async_trait]
impl UserPoolAdmin for LocalUserPool {
    async fn admin_update_user_attributes(
        &self,
        user_pool_id: &str,
        username: &str,
        attributes: &[UserAttribute],
    ) -> Result<(), AdminError> {
        if user_pool_id != self.user_pool_id {
            return Err(AdminError::PoolNotFound(user_pool_id.to_string()));
        }

        let mut account = self
            .accounts
            .get_mut(username)
            .ok_or_else(|| AdminError::UserNotFound(username.to_string()))?;

        for attr in attributes {
            account.set_attribute(&attr.name, &attr.value);
        }
        Ok(())
    }
}

impl std::fmt::Debug for LocalUserPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalUserPool")
            .field("user_pool_id", &self.user_pool_id)
            .field("accounts", &self.accounts.len())
            .finish_non_exhaustive()
    }
}
