use identity_pool::{
    build_router,
    config::IdentityPoolConfig,
    services::{LocalUserPool, TokenIssuer},
    AppState,
};
use service_core::observability::{init_metrics, init_tracing};
use std::net::SocketAddr;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    let config = IdentityPoolConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )?;
    init_metrics();

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        user_pool_id = %config.user_pool_id,
        "Starting local identity pool"
    );

    let issuer = match &config.signing.private_key_path {
        Some(path) => {
            let pem = std::fs::read_to_string(path)?;
            TokenIssuer::from_pem(&pem, &config.signing.key_id, config.issuer(), &config.client_id)?
        }
        None => {
            tracing::warn!("No signing key configured, generating an ephemeral key");
            TokenIssuer::generate(&config.signing.key_id, config.issuer(), &config.client_id)?
        }
    };

    let state = AppState {
        service_name: config.service_name.clone(),
        pool: LocalUserPool::new(&config.user_pool_id, issuer),
    };
    let app = build_router(state);

    let addr = SocketAddr::new(config.bind_address, config.common.port);
    tracing::info!(address = %addr, issuer = %config.issuer(), "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
