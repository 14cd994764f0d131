//! Build-time constants of the web application.

use service_core::config::Environment;
use std::env;

/// Selects between the development and production builds.
pub const APP_ENV: &str = "APP_ENV";

pub const DEFAULT_API_URL: &str = "https://localhost:3000/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConstants {
    pub is_dev_mode: bool,
    pub is_mock_mode: bool,
    pub api_url: String,
    pub base_url: String,
}

impl AppConstants {
    /// Anything other than an explicit production environment is a dev build.
    pub fn for_environment(app_env: Option<&str>) -> Self {
        let is_prod = matches!(
            app_env.map(str::parse::<Environment>),
            Some(Ok(Environment::Prod))
        );

        Self {
            is_dev_mode: !is_prod,
            is_mock_mode: false,
            api_url: DEFAULT_API_URL.to_string(),
            base_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn from_env() -> Self {
        let app_env = env::var(APP_ENV).ok();
        let constants = Self::for_environment(app_env.as_deref());
        tracing::debug!(
            api_url = %constants.api_url,
            base_url = %constants.base_url,
            dev_mode = constants.is_dev_mode,
            "Resolved application constants"
        );
        constants
    }
}
