use serde::Deserialize;
use service_core::config::{self as core_config, get_env, Environment};
use service_core::error::AppError;
use std::net::{IpAddr, Ipv4Addr};

/// Loopback unless `BIND_ADDRESS` says otherwise.
pub const DEFAULT_BIND_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityPoolConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    /// Public base URL; the issuer is `<base>/<user_pool_id>`.
    pub issuer_base_url: String,
    pub bind_address: IpAddr,
    pub signing: SigningKeyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SigningKeyConfig {
    pub key_id: String,
    /// PEM file with the RSA signing key. A key is generated at startup
    /// when unset.
    pub private_key_path: Option<String>,
}

impl IdentityPoolConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let environment = Environment::from_env()?;
        let is_prod = environment.is_prod();

        let default_base = format!("http://localhost:{}", common.port);

        Ok(Self {
            environment,
            service_name: get_env("SERVICE_NAME", Some("identity-pool"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            region: get_env("AWS_REGION", Some("eu-west-1"), is_prod)?,
            user_pool_id: get_env("USER_POOL_ID", Some("eu-west-1_LocalPool"), is_prod)?,
            client_id: get_env("USER_POOL_CLIENT_ID", Some("local-client"), is_prod)?,
            issuer_base_url: get_env("ISSUER_BASE_URL", Some(&default_base), is_prod)?,
            bind_address: parse_bind_address(std::env::var("BIND_ADDRESS").ok().as_deref())?,
            signing: SigningKeyConfig {
                key_id: get_env("SIGNING_KEY_ID", Some("local-key-1"), is_prod)?,
                private_key_path: std::env::var("SIGNING_PRIVATE_KEY_PATH").ok(),
            },
            common,
        })
    }

    pub fn issuer(&self) -> String {
        format!(
            "{}/{}",
            self.issuer_base_url.trim_end_matches('/'),
            self.user_pool_id
        )
    }
}

fn parse_bind_address(value: Option<&str>) -> Result<IpAddr, AppError> {
    match value {
        None => Ok(DEFAULT_BIND_ADDRESS),
        Some(value) => value.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid BIND_ADDRESS {}: {}", value, e))
        }),
    }
}
