//! Deployment settings read from the environment.

use serde::Serialize;
use service_core::config::{env_flag, get_env, Environment};
use service_core::error::AppError;
use validator::{Validate, ValidationError};

pub const DOMAIN_PREFIX_ENV: &str = "COGNITO_DOMAIN_PREFIX";
pub const CALLBACK_URL_LOCAL_MODE_ENV: &str = "COGNITO_CALLBACK_URL_LOCAL_MODE";
pub const CALLBACK_URL_ENV: &str = "COGNITO_CALLBACK_URL";
pub const LOGOUT_URL_ENV: &str = "COGNITO_LOGOUT_URL";
pub const IS_LOCAL_ENV: &str = "IS_LOCAL";

const RESERVED_DOMAIN_WORDS: [&str; 3] = ["aws", "amazon", "cognito"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StackSettings {
    #[validate(length(min = 1, max = 63), custom(function = "validate_domain_prefix"))]
    pub domain_prefix: String,
    #[validate(url)]
    pub callback_url_local_mode: String,
    #[validate(url)]
    pub callback_url: String,
    #[validate(url)]
    pub logout_url: String,
    /// Deployed for a developer's local frontend.
    pub is_local: bool,
    #[validate(length(min = 1))]
    pub region: String,
}

impl StackSettings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let environment = Environment::from_env()?;
        let is_prod = environment.is_prod();

        let settings = Self {
            domain_prefix: get_env(DOMAIN_PREFIX_ENV, None, is_prod)?,
            callback_url_local_mode: get_env(
                CALLBACK_URL_LOCAL_MODE_ENV,
                Some("http://localhost:3000/"),
                is_prod,
            )?,
            callback_url: get_env(CALLBACK_URL_ENV, None, is_prod)?,
            logout_url: get_env(LOGOUT_URL_ENV, None, is_prod)?,
            is_local: env_flag(IS_LOCAL_ENV),
            region: get_env("AWS_REGION", Some("eu-west-1"), is_prod)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Where the hosted UI sends the user after signing in.
    pub fn redirect_sign_in(&self) -> &str {
        if self.is_local {
            &self.callback_url_local_mode
        } else {
            &self.callback_url
        }
    }

    /// Where the hosted UI sends the user after signing out. A local
    /// deployment returns to the local frontend for both.
    pub fn redirect_sign_out(&self) -> &str {
        if self.is_local {
            &self.callback_url_local_mode
        } else {
            &self.logout_url
        }
    }

    /// Origins allowed to call the API from a browser.
    pub fn allowed_origins(&self) -> Vec<String> {
        vec![
            self.callback_url_local_mode.clone(),
            self.callback_url.clone(),
        ]
    }
}

/// Hosted UI domain prefixes: lowercase letters, digits and inner hyphens,
/// without the reserved words.
fn validate_domain_prefix(prefix: &str) -> Result<(), ValidationError> {
    let well_formed = prefix
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !prefix.starts_with('-')
        && !prefix.ends_with('-');
    if !well_formed {
        return Err(ValidationError::new("domain_prefix_format"));
    }

    if RESERVED_DOMAIN_WORDS.iter().any(|word| prefix.contains(word)) {
        return Err(ValidationError::new("domain_prefix_reserved"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(is_local: bool) -> StackSettings {
        StackSettings {
            domain_prefix: "cloud-spider".to_string(),
            callback_url_local_mode: "http://localhost:3000/".to_string(),
            callback_url: "https://cloudspider.example.com/".to_string(),
            logout_url: "https://cloudspider.example.com/logout".to_string(),
            is_local,
            region: "eu-west-1".to_string(),
        }
    }

    #[test]
    fn local_deployment_redirects_to_local_frontend() {
        let local = settings(true);
        assert_eq!(local.redirect_sign_in(), "http://localhost:3000/");
        assert_eq!(local.redirect_sign_out(), "http://localhost:3000/");

        let deployed = settings(false);
        assert_eq!(deployed.redirect_sign_in(), "https://cloudspider.example.com/");
        assert_eq!(
            deployed.redirect_sign_out(),
            "https://cloudspider.example.com/logout"
        );
    }

    #[test]
    fn cors_allows_both_callback_origins() {
        assert_eq!(
            settings(false).allowed_origins(),
            vec![
                "http://localhost:3000/".to_string(),
                "https://cloudspider.example.com/".to_string()
            ]
        );
    }

    #[test]
    fn valid_settings_pass_validation() {
        assert!(settings(false).validate().is_ok());
    }

    #[test]
    fn domain_prefix_rules() {
        assert!(validate_domain_prefix("cloud-spider-1").is_ok());
        assert!(validate_domain_prefix("Cloud").is_err());
        assert!(validate_domain_prefix("-spider").is_err());
        assert!(validate_domain_prefix("my_pool").is_err());
        assert!(validate_domain_prefix("my-cognito-pool").is_err());
    }

    #[test]
    fn malformed_callback_is_rejected() {
        let mut invalid = settings(false);
        invalid.callback_url = "not a url".to_string();
        assert!(invalid.validate().is_err());
    }
}
