//! identity-pool: the user pool's lifecycle hooks, plus a local pool that
//! stands in for the managed one during development and tests.
//!
//! The local pool is for local use only. Its federated sign-in endpoint
//! trusts the provider profile in the request body without any proof from
//! the provider, and federated accounts are not checked against the email
//! alias of existing accounts. It binds to loopback unless `BIND_ADDRESS`
//! is set.
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod triggers;
pub mod utils;

use axum::{
    middleware::from_fn,
    routing::{get, patch, post},
    Json, Router,
};
use service_core::middleware::{metrics::metrics_middleware, request_context_middleware};
use tower_http::trace::TraceLayer;

use crate::services::LocalUserPool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub service_name: String,
    pub pool: LocalUserPool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/:user_pool_id/.well-known/jwks.json",
            get(handlers::well_known::jwks),
        )
        .route("/signup", post(handlers::auth::sign_up))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/federated/:provider", post(handlers::auth::federated))
        .route("/users/me", get(handlers::user::get_me))
        .route(
            "/users/me/attributes",
            patch(handlers::user::update_attributes),
        )
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(from_fn(request_context_middleware))
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": state.service_name,
        "userPoolId": state.pool.user_pool_id(),
    }))
}
