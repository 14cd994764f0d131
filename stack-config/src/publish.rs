//! Where the stacks record is published.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ssm::{
    config::Region,
    types::ParameterType,
    Client as SsmClient,
};
use service_core::config::stacks::STACKS_CONFIG_PARAMETER;
use service_core::config::StacksConfig;
use service_core::error::AppError;
use std::path::{Path, PathBuf};

use crate::definition::STACKS_CONFIG_DESCRIPTION;

/// File name the frontend reads the record from.
pub const FRONTEND_CONFIG_FILE: &str = "aws-config.json";

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, record: &StacksConfig) -> Result<(), AppError>;

    /// Human-readable destination, for logs.
    fn target(&self) -> String;
}

/// Account-level SSM parameter read by other stacks.
pub struct SsmPublisher {
    client: SsmClient,
    parameter_name: String,
}

impl SsmPublisher {
    pub fn new(client: SsmClient) -> Self {
        Self {
            client,
            parameter_name: STACKS_CONFIG_PARAMETER.to_string(),
        }
    }

    pub async fn for_region(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(SsmClient::new(&config))
    }
}

#[async_trait]
impl Publisher for SsmPublisher {
    async fn publish(&self, record: &StacksConfig) -> Result<(), AppError> {
        let value = record.to_json()?;

        self.client
            .put_parameter()
            .name(&self.parameter_name)
            .description(STACKS_CONFIG_DESCRIPTION)
            .value(value)
            .r#type(ParameterType::String)
            .overwrite(true)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                tracing::error!(
                    parameter = %self.parameter_name,
                    error = %err,
                    "PutParameter failed"
                );
                AppError::BadGateway(format!("Failed to publish stacks configuration: {}", err))
            })?;

        Ok(())
    }

    fn target(&self) -> String {
        format!("ssm:{}", self.parameter_name)
    }
}

/// JSON file for the frontend build.
pub struct FilePublisher {
    path: PathBuf,
}

impl FilePublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `aws-config.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(FRONTEND_CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Publisher for FilePublisher {
    async fn publish(&self, record: &StacksConfig) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}

/// Publish to every target, stopping at the first failure.
pub async fn publish_all(
    publishers: &[Box<dyn Publisher>],
    record: &StacksConfig,
) -> Result<(), AppError> {
    for publisher in publishers {
        publisher.publish(record).await?;
        tracing::info!(destination = %publisher.target(), "Published stacks configuration");
    }
    Ok(())
}
