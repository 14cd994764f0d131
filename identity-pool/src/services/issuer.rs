use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rsa::{
    pkcs1::DecodeRsaPrivateKey,
    pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding},
    traits::PublicKeyParts,
    RsaPrivateKey,
};
use serde::Serialize;
use service_core::auth::token::{Jwk, Jwks, TokenClaims};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::account::Account;
use crate::models::session::{
    RefreshTokenClaims, SessionTokens, ACCESS_TOKEN_VALIDITY_MINUTES, ID_TOKEN_VALIDITY_MINUTES,
    REFRESH_TOKEN_VALIDITY_MINUTES, TOKEN_USE_REFRESH,
};

/// Scopes granted to tokens obtained through the hosted UI.
pub const ACCESS_TOKEN_SCOPE: &str = "phone email profile openid aws.cognito.signin.user.admin";

/// Signs the pool's access, ID and refresh tokens with a single RS256 key.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    key_id: String,
    issuer: String,
    client_id: String,
    jwks: Arc<Jwks>,
}

impl TokenIssuer {
    /// Load the signing key from a PKCS#8 or PKCS#1 PEM.
    pub fn from_pem(
        private_key_pem: &str,
        key_id: impl Into<String>,
        issuer: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Result<Self, anyhow::Error> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_key_pem))
            .map_err(|e| anyhow::anyhow!("Failed to parse private key: {}", e))?;

        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| anyhow::anyhow!("Failed to load signing key: {}", e))?;

        let public_key = private_key.to_public_key();
        let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

        let decoding_key = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|e| anyhow::anyhow!("Failed to derive verification key: {}", e))?;

        let key_id = key_id.into();
        let jwks = Jwks {
            keys: vec![Jwk {
                kid: key_id.clone(),
                kty: "RSA".to_string(),
                alg: Some("RS256".to_string()),
                key_use: Some("sig".to_string()),
                n,
                e,
            }],
        };

        tracing::info!(kid = %key_id, "Token issuer initialized with RS256 key");

        Ok(Self {
            encoding_key,
            decoding_key,
            key_id,
            issuer: issuer.into(),
            client_id: client_id.into(),
            jwks: Arc::new(jwks),
        })
    }

    /// Generate a throwaway 2048-bit key. Tokens signed with it do not
    /// survive a restart.
    pub fn generate(
        key_id: impl Into<String>,
        issuer: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Result<Self, anyhow::Error> {
        let mut rng = rand::rngs::OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, 2048)
            .map_err(|e| anyhow::anyhow!("Failed to generate RSA key: {}", e))?;
        let pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| anyhow::anyhow!("Failed to encode RSA key: {}", e))?;
        Self::from_pem(&pem, key_id, issuer, client_id)
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn jwks(&self) -> &Jwks {
        &self.jwks
    }

    /// Issue the full token set for a freshly authenticated account.
    pub fn issue(&self, account: &Account) -> Result<SessionTokens, anyhow::Error> {
        let refresh_token = self.refresh_token(account)?;
        self.issue_with_refresh(account, refresh_token)
    }

    /// Issue new access and ID tokens, handing back the caller's refresh token.
    pub fn issue_with_refresh(
        &self,
        account: &Account,
        refresh_token: String,
    ) -> Result<SessionTokens, anyhow::Error> {
        Ok(SessionTokens {
            access_token: self.access_token(account)?,
            id_token: self.id_token(account)?,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: ACCESS_TOKEN_VALIDITY_MINUTES * 60,
        })
    }

    fn access_token(&self, account: &Account) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: account.sub.clone(),
            token_use: "access".to_string(),
            username: Some(account.username.clone()),
            cognito_username: None,
            groups: Vec::new(),
            email: None,
            email_verified: None,
            scope: Some(ACCESS_TOKEN_SCOPE.to_string()),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ACCESS_TOKEN_VALIDITY_MINUTES)).timestamp(),
            iss: self.issuer.clone(),
            aud: None,
            client_id: Some(self.client_id.clone()),
            jti: Some(Uuid::new_v4().to_string()),
        };
        self.sign(&claims)
    }

    fn id_token(&self, account: &Account) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: account.sub.clone(),
            token_use: "id".to_string(),
            username: None,
            cognito_username: Some(account.username.clone()),
            groups: Vec::new(),
            email: account.email().map(str::to_string),
            email_verified: account.email().map(|_| account.email_verified()),
            scope: None,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ID_TOKEN_VALIDITY_MINUTES)).timestamp(),
            iss: self.issuer.clone(),
            aud: Some(self.client_id.clone()),
            client_id: None,
            jti: Some(Uuid::new_v4().to_string()),
        };
        self.sign(&claims)
    }

    fn refresh_token(&self, account: &Account) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = RefreshTokenClaims {
            sub: account.sub.clone(),
            username: account.username.clone(),
            token_use: TOKEN_USE_REFRESH.to_string(),
            client_id: self.client_id.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(REFRESH_TOKEN_VALIDITY_MINUTES)).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        self.sign(&claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, anyhow::Error> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key_id.clone());
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode token: {}", e))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_aud = false;
        validation
    }

    /// Verify one of this issuer's access tokens.
    pub fn verify_access_token(&self, token: &str) -> Result<TokenClaims, anyhow::Error> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| anyhow::anyhow!("Invalid access token: {}", e))?
            .claims;

        if claims.token_use != "access" || claims.client_id.as_deref() != Some(self.client_id.as_str()) {
            anyhow::bail!("Token is not an access token for this client");
        }
        Ok(claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, anyhow::Error> {
        let claims = decode::<RefreshTokenClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| anyhow::anyhow!("Invalid refresh token: {}", e))?
            .claims;

        if claims.token_use != TOKEN_USE_REFRESH || claims.client_id != self.client_id {
            anyhow::bail!("Token is not a refresh token for this client");
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("key_id", &self.key_id)
            .field("issuer", &self.issuer)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}
