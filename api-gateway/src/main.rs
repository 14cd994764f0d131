use api_gateway::{config::GatewayConfig, Application};
use service_core::observability::{init_metrics, init_tracing};

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    let config = GatewayConfig::from_env()?;

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
        "Starting API gateway"
    );

    if config.signing.credentials.is_empty() {
        tracing::warn!("No signing credentials configured; every signed request will be rejected");
    }

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;
    Ok(())
}
