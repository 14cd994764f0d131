use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::FrontendError;
use crate::hosted_ui::HostedUi;

/// Token endpoint response, as returned by the hosted UI.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: SecretString,
    pub id_token: SecretString,
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// The signed-in user's tokens.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: SecretString,
    id_token: SecretString,
    refresh_token: Option<SecretString>,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        access_token: SecretString,
        id_token: SecretString,
        refresh_token: Option<SecretString>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            id_token,
            refresh_token,
            expires_at,
        }
    }

    pub fn from_token_response(response: TokenResponse) -> Self {
        Self::new(
            response.access_token,
            response.id_token,
            response.refresh_token,
            Utc::now() + Duration::seconds(response.expires_in),
        )
    }

    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    pub fn id_token(&self) -> &SecretString {
        &self.id_token
    }

    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at && !self.access_token.expose_secret().is_empty()
    }

    /// Value of the `Authorization` header for bearer-token routes.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.access_token.expose_secret())
    }
}

/// Source of the current session, consulted before each bearer-token call.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session, or [`FrontendError::NoSession`] if nobody is
    /// signed in or the session has expired.
    async fn current_session(&self) -> Result<Session, FrontendError>;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: RwLock<Option<Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    pub async fn clear(&self) {
        *self.session.write().await = None;
    }

    /// The stored session, expired or not.
    pub async fn get(&self) -> Option<Session> {
        self.session.read().await.clone()
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionStore {
    async fn current_session(&self) -> Result<Session, FrontendError> {
        match self.session.read().await.as_ref() {
            Some(session) if session.is_valid_at(Utc::now()) => Ok(session.clone()),
            Some(_) => {
                tracing::debug!("Session expired");
                Err(FrontendError::NoSession)
            }
            None => Err(FrontendError::NoSession),
        }
    }
}

/// Session store that renews an expired access token with the session's
/// refresh token before handing the session out.
pub struct RefreshingSessionStore {
    store: InMemorySessionStore,
    hosted_ui: HostedUi,
}

impl RefreshingSessionStore {
    pub fn new(hosted_ui: HostedUi) -> Self {
        Self {
            store: InMemorySessionStore::new(),
            hosted_ui,
        }
    }

    pub async fn set(&self, session: Session) {
        self.store.set(session).await;
    }

    pub async fn clear(&self) {
        self.store.clear().await;
    }

    pub async fn get(&self) -> Option<Session> {
        self.store.get().await
    }
}

#[async_trait]
impl SessionProvider for RefreshingSessionStore {
    async fn current_session(&self) -> Result<Session, FrontendError> {
        // Held across the refresh so concurrent callers renew once.
        let mut guard = self.store.session.write().await;

        let expired = match guard.as_ref() {
            Some(session) if session.is_valid_at(Utc::now()) => return Ok(session.clone()),
            Some(session) if session.refresh_token().is_some() => session.clone(),
            Some(_) => {
                tracing::debug!("Session expired without a refresh token");
                return Err(FrontendError::NoSession);
            }
            None => return Err(FrontendError::NoSession),
        };

        match self.hosted_ui.refresh(&expired).await {
            Ok(refreshed) => {
                tracing::info!("Session refreshed");
                *guard = Some(refreshed.clone());
                Ok(refreshed)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed");
                if matches!(e, FrontendError::Status { .. }) {
                    *guard = None;
                }
                Err(FrontendError::NoSession)
            }
        }
    }
}
