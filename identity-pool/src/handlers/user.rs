use axum::{extract::State, Json};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Deserialize;
use service_core::error::AppError;
use std::collections::BTreeMap;

use crate::models::AccountView;
use crate::services::UserAttribute;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateAttributesRequest {
    pub attributes: BTreeMap<String, String>,
}

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

fn access_token(header: BearerHeader) -> Result<String, AppError> {
    header
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
        .ok_or_else(|| AppError::unauthorized("Missing access token"))
}

pub async fn get_me(
    State(state): State<AppState>,
    bearer: BearerHeader,
) -> Result<Json<AccountView>, AppError> {
    let account = state.pool.get_user(&access_token(bearer)?).await?;
    Ok(Json(account))
}

pub async fn update_attributes(
    State(state): State<AppState>,
    bearer: BearerHeader,
    Json(payload): Json<UpdateAttributesRequest>,
) -> Result<Json<AccountView>, AppError> {
    let token = access_token(bearer)?;
    let attributes: Vec<UserAttribute> = payload
        .attributes
        .into_iter()
        .map(|(name, value)| UserAttribute::new(name, value))
        .collect();

    let account = state
        .pool
        .update_user_attributes(&token, &attributes)
        .await?;
    Ok(Json(account))
}
