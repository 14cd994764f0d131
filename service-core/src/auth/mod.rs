//! Credential and token validation shared by the gateway middleware.
pub mod credentials;
pub mod token;

pub use credentials::{CredentialStore, StaticCredentialStore};
pub use token::{cognito_issuer, TokenClaims, TokenError, TokenValidator, TokenValidatorConfig};
