use secrecy::SecretString;
use serde::Deserialize;
use service_core::auth::cognito_issuer;
use service_core::config::{self as core_config, get_env, Environment};
use service_core::error::AppError;
use std::env;

/// Callback URLs whose origins may call the API from a browser.
pub const CALLBACK_URL_LOCAL_ENV: &str = "COGNITO_CALLBACK_URL_LOCAL_MODE";
pub const CALLBACK_URL_ENV: &str = "COGNITO_CALLBACK_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub region: String,
    pub allowed_origins: Vec<String>,
    pub token: TokenConfig,
    pub signing: SigningConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub issuer: String,
    pub client_id: String,
    pub jwks_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SigningConfig {
    pub max_clock_skew_secs: i64,
    /// Access key id and signing secret pairs accepted on the signed route.
    #[serde(skip)]
    pub credentials: Vec<(String, SecretString)>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let environment = Environment::from_env()?;
        let is_prod = environment.is_prod();

        let region = get_env("AWS_REGION", Some("eu-west-1"), is_prod)?;
        let user_pool_id = get_env("USER_POOL_ID", Some("eu-west-1_LocalPool"), is_prod)?;
        let issuer = match env::var("TOKEN_ISSUER") {
            Ok(issuer) => issuer,
            Err(_) => cognito_issuer(&region, &user_pool_id),
        };

        let callback_urls: Vec<String> = [CALLBACK_URL_LOCAL_ENV, CALLBACK_URL_ENV]
            .iter()
            .filter_map(|key| env::var(key).ok())
            .collect();

        Ok(Self {
            environment,
            service_name: get_env("SERVICE_NAME", Some("api-gateway"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            allowed_origins: allowed_origins(&callback_urls),
            token: TokenConfig {
                issuer,
                client_id: get_env("USER_POOL_CLIENT_ID", Some("local-client"), is_prod)?,
                jwks_url: env::var("JWKS_URL").ok(),
            },
            signing: SigningConfig {
                max_clock_skew_secs: get_env("MAX_CLOCK_SKEW_SECS", Some("60"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
                credentials: parse_credentials(&get_env("IAM_CREDENTIALS", Some(""), is_prod)?)?,
            },
            region,
            common,
        })
    }
}

/// Origins of the given callback URLs, deduplicated. Unparseable URLs are
/// logged and skipped.
pub fn allowed_origins(callback_urls: &[String]) -> Vec<String> {
    let mut origins: Vec<String> = Vec::new();
    for url in callback_urls {
        match reqwest::Url::parse(url) {
            Ok(parsed) => {
                let origin = parsed.origin().ascii_serialization();
                if !origins.contains(&origin) {
                    origins.push(origin);
                }
            }
            Err(e) => tracing::warn!(url = %url, error = %e, "Ignoring invalid callback URL"),
        }
    }
    origins
}

/// Parses `key:secret` pairs separated by commas.
pub fn parse_credentials(raw: &str) -> Result<Vec<(String, SecretString)>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, secret) = pair.split_once(':').ok_or_else(|| {
                AppError::config("IAM_CREDENTIALS entries must look like KEY_ID:SECRET")
            })?;
            Ok((key.to_string(), SecretString::new(secret.to_string())))
        })
        .collect()
}
