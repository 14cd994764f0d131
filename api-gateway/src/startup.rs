use axum::{
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, MethodRouter},
    Router,
};
use service_core::auth::{StaticCredentialStore, TokenValidator, TokenValidatorConfig};
use service_core::error::AppError;
use service_core::middleware::{
    bearer_token_middleware, metrics::metrics_middleware, request_context_middleware,
    signed_request_middleware, SignedRequestConfig,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::handlers;
use crate::routes::{RouteAuthorization, PRIVATE_IAM_PATH, PRIVATE_JWT_PATH};
use crate::GatewayState;

impl GatewayState {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let mut store = StaticCredentialStore::new();
        for (key_id, secret) in &config.signing.credentials {
            store = store.with_credential(key_id.clone(), secret.clone());
        }

        let mut token_config =
            TokenValidatorConfig::new(&config.token.issuer, &config.token.client_id);
        if let Some(jwks_url) = &config.token.jwks_url {
            token_config = token_config.with_jwks_url(jwks_url);
        }

        let mut signing = SignedRequestConfig::new(&config.region);
        signing.max_clock_skew_secs = config.signing.max_clock_skew_secs;

        Self {
            service_name: config.service_name.clone(),
            allowed_origins: config.allowed_origins.clone(),
            signing,
            credentials: Arc::new(store),
            validator: TokenValidator::new(token_config),
        }
    }
}

fn guarded(
    state: &GatewayState,
    authorization: RouteAuthorization,
    route: MethodRouter<GatewayState>,
) -> MethodRouter<GatewayState> {
    let route = route.fallback(handlers::forbidden);
    match authorization {
        RouteAuthorization::SignedRequest => route.route_layer(from_fn_with_state(
            state.clone(),
            signed_request_middleware::<GatewayState>,
        )),
        RouteAuthorization::BearerToken => route.route_layer(from_fn_with_state(
            state.clone(),
            bearer_token_middleware::<GatewayState>,
        )),
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %origin, error = %e, "Invalid CORS origin, skipping");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

pub fn build_router(state: GatewayState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .route(
            PRIVATE_IAM_PATH,
            guarded(
                &state,
                RouteAuthorization::SignedRequest,
                get(handlers::private_iam),
            ),
        )
        .route(
            PRIVATE_JWT_PATH,
            guarded(
                &state,
                RouteAuthorization::BearerToken,
                get(handlers::private_jwt),
            ),
        )
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .fallback(handlers::forbidden)
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
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_context_middleware))
        .layer(cors)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let state = GatewayState::from_config(&config);
        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(address = %addr, error = %e, "Failed to bind TCP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            issuer = %config.token.issuer,
            region = %config.region,
            origins = ?config.allowed_origins,
            "Gateway listening"
        );

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
