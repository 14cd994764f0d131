use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::Value;
use service_core::error::AppError;
use std::collections::HashMap;
use validator::Validate;

use crate::models::{AccountView, FederatedProvider, ProviderProfile, SessionTokens};
use crate::services::SignUpRequest;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct FederatedCallback {
    pub subject: String,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AccountView>), AppError> {
    payload.validate()?;
    let account = state.pool.sign_up(payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    let tokens = state
        .pool
        .authenticate(&payload.username, &payload.password)
        .await?;
    Ok(Json(tokens))
}

/// Completes a federated sign-in with the profile the provider returned.
/// The profile is taken as given; the local pool does not verify it with
/// the provider.
pub async fn federated(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(payload): Json<FederatedCallback>,
) -> Result<Json<SessionTokens>, AppError> {
    let provider: FederatedProvider = provider
        .parse()
        .map_err(|e: String| AppError::NotFound(anyhow::anyhow!(e)))?;

    let tokens = state
        .pool
        .federated_sign_in(ProviderProfile {
            provider,
            subject: payload.subject,
            attributes: payload.attributes,
        })
        .await?;
    Ok(Json(tokens))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<SessionTokens>, AppError> {
    let tokens = state.pool.refresh(&payload.refresh_token).await?;
    Ok(Json(tokens))
}
