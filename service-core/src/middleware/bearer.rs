use crate::auth::{TokenClaims, TokenError, TokenValidator};
use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

/// Requires a valid `Authorization: Bearer <jwt>` issued by the configured
/// user pool for the configured client. Verified claims are stored in the
/// request extensions.
pub async fn bearer_token_middleware<S>(
    State(state): State<S>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError>
where
    S: AsRef<TokenValidator> + Clone + Send + Sync + 'static,
{
    let validator: &TokenValidator = state.as_ref();

    let bearer = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(TokenError::Missing)?;

    let claims = validator.validate(bearer.token()).await.map_err(|e| {
        tracing::info!(error = %e, "Rejected bearer token");
        e
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extractor for the claims verified by [`bearer_token_middleware`].
pub struct AuthenticatedUser(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<TokenClaims>().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Auth claims missing from request extensions"
            ))
        })?;

        Ok(AuthenticatedUser(claims.clone()))
    }
}
