//! Bearer token validation against a user pool's JWKS.

use chrono::Utc;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::error::AppError;

const KNOWN_KIDS_KEY: &str = "jwks";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("missing bearer token")]
    Missing,

    #[error("invalid token")]
    Invalid,

    #[error("token expired")]
    Expired,

    #[error("token audience does not match the configured client")]
    AudienceMismatch,

    #[error("token use '{0}' is not accepted")]
    UnsupportedUse(String),

    #[error("failed to load signing keys: {0}")]
    Jwks(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Jwks(msg) => AppError::BadGateway(msg),
            other => AppError::Unauthorized(anyhow::Error::new(other)),
        }
    }
}

pub fn cognito_issuer(region: &str, user_pool_id: &str) -> String {
    format!("https://cognito-idp.{}.amazonaws.com/{}", region, user_pool_id)
}

/// Trust anchor of the bearer-token routes: the issuing pool and the app
/// client the tokens must be bound to.
#[derive(Debug, Clone)]
pub struct TokenValidatorConfig {
    pub issuer: String,
    pub client_id: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
}

impl TokenValidatorConfig {
    pub fn new(issuer: impl Into<String>, client_id: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let jwks_url = format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'));
        Self {
            issuer,
            client_id: client_id.into(),
            jwks_url,
            jwks_cache_ttl: Duration::from_secs(3600),
        }
    }

    pub fn for_user_pool(region: &str, user_pool_id: &str, client_id: impl Into<String>) -> Self {
        Self::new(cognito_issuer(region, user_pool_id), client_id)
    }

    pub fn with_jwks_url(mut self, jwks_url: impl Into<String>) -> Self {
        self.jwks_url = jwks_url.into();
        self
    }

}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kid: String,
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    pub n: String,
    pub e: String,
}

/// Claims of a user pool access or ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub token_use: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(
        rename = "cognito:username",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cognito_username: Option<String>,
    #[serde(rename = "cognito:groups", default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    /// App client id, present on ID tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// App client id, present on access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl TokenClaims {
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// The client the token is bound to: `client_id` for access tokens,
    /// `aud` for ID tokens.
    pub fn bound_client_id(&self) -> Option<&str> {
        match self.token_use.as_str() {
            "access" => self.client_id.as_deref(),
            "id" => self.aud.as_deref(),
            _ => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .or(self.cognito_username.as_deref())
    }
}

/// Validates RS256 bearer tokens, caching the issuer's keys.
///
/// Once a key set has been fetched, unknown key ids are rejected without a
/// refetch until the cache entry expires.
#[derive(Clone)]
pub struct TokenValidator {
    config: TokenValidatorConfig,
    http_client: reqwest::Client,
    key_cache: Cache<String, Arc<DecodingKey>>,
    known_kids: Cache<String, Arc<Vec<String>>>,
}

impl TokenValidator {
    pub fn new(config: TokenValidatorConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(config, http_client)
    }

    pub fn with_client(config: TokenValidatorConfig, http_client: reqwest::Client) -> Self {
        let ttl = config.jwks_cache_ttl;
        Self {
            config,
            http_client,
            key_cache: Cache::builder().time_to_live(ttl).max_capacity(100).build(),
            known_kids: Cache::builder().time_to_live(ttl).max_capacity(1).build(),
        }
    }

    pub fn config(&self) -> &TokenValidatorConfig {
        &self.config
    }

    pub async fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode token header");
            TokenError::Invalid
        })?;

        let kid = header.kid.ok_or_else(|| {
            tracing::debug!("Token missing kid");
            TokenError::Invalid
        })?;

        let decoding_key = self.get_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        // ID tokens carry the client in `aud`, access tokens in `client_id`.
        validation.validate_aud = false;

        let claims = decode::<TokenClaims>(token, &decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token validation failed");
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?
            .claims;

        if claims.token_use != "access" && claims.token_use != "id" {
            return Err(TokenError::UnsupportedUse(claims.token_use));
        }

        let client_matches = claims.bound_client_id().is_some_and(|id| {
            id.as_bytes()
                .ct_eq(self.config.client_id.as_bytes())
                .into()
        });
        if !client_matches {
            tracing::debug!(
                expected = %self.config.client_id,
                actual = ?claims.bound_client_id(),
                "Token bound to a different client"
            );
            return Err(TokenError::AudienceMismatch);
        }

        if claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    async fn get_key(&self, kid: &str) -> Result<Arc<DecodingKey>, TokenError> {
        if let Some(key) = self.key_cache.get(kid).await {
            return Ok(key);
        }

        if let Some(known) = self.known_kids.get(KNOWN_KIDS_KEY).await {
            if !known.iter().any(|k| k == kid) {
                tracing::debug!(kid = %kid, "Unknown key id not in cached JWKS");
                return Err(TokenError::Invalid);
            }
        }

        let jwks = self.fetch_jwks().await?;

        let kids: Vec<String> = jwks.keys.iter().map(|k| k.kid.clone()).collect();
        self.known_kids
            .insert(KNOWN_KIDS_KEY.to_string(), Arc::new(kids))
            .await;

        let mut found = None;
        for jwk in &jwks.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    let key = Arc::new(key);
                    if jwk.kid == kid {
                        found = Some(key.clone());
                    }
                    self.key_cache.insert(jwk.kid.clone(), key).await;
                }
                Err(e) => tracing::warn!(kid = %jwk.kid, error = %e, "Skipping unusable JWK"),
            }
        }

        found.ok_or_else(|| {
            tracing::debug!(kid = %kid, "Key not found in JWKS");
            TokenError::Invalid
        })
    }

    async fn fetch_jwks(&self) -> Result<Jwks, TokenError> {
        let url = &self.config.jwks_url;
        tracing::debug!(url = %url, "Fetching JWKS");

        let response = self.http_client.get(url).send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to fetch JWKS");
            TokenError::Jwks(format!("request to {} failed", url))
        })?;

        if !response.status().is_success() {
            tracing::error!(url = %url, status = %response.status(), "JWKS fetch failed");
            return Err(TokenError::Jwks(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        response.json::<Jwks>().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to parse JWKS");
            TokenError::Jwks("malformed key set".to_string())
        })
    }
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
