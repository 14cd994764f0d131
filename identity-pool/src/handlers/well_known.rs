use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::AppState;

/// Public keys of the pool, served under the issuer path.
pub async fn jwks(
    State(state): State<AppState>,
    Path(user_pool_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if user_pool_id != state.pool.user_pool_id() {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "User pool {} does not exist",
            user_pool_id
        )));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        Json(state.pool.issuer().jwks().clone()),
    ))
}
