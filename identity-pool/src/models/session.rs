use serde::{Deserialize, Serialize};

pub const ACCESS_TOKEN_VALIDITY_MINUTES: i64 = 10;
pub const ID_TOKEN_VALIDITY_MINUTES: i64 = 10;
pub const REFRESH_TOKEN_VALIDITY_MINUTES: i64 = 60;

pub const TOKEN_USE_REFRESH: &str = "refresh";

/// Tokens returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub username: String,
    pub token_use: String,
    pub client_id: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}
