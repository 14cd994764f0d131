//! Hosted UI URLs and the authorization code exchange.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::config::ClientConfiguration;
use crate::error::FrontendError;
use crate::session::{Session, TokenResponse};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HostedUi {
    base_url: String,
    client_id: String,
    scope: String,
    response_type: String,
    redirect_sign_in: String,
    redirect_sign_out: String,
    http: Client,
}

impl HostedUi {
    pub fn new(config: &ClientConfiguration) -> Result<Self, FrontendError> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            base_url: format!("https://{}", config.oauth.domain),
            client_id: config.auth.user_pool_web_client_id.clone(),
            scope: config.oauth.scope.join(" "),
            response_type: config.oauth.response_type.clone(),
            redirect_sign_in: config.oauth.redirect_sign_in.clone(),
            redirect_sign_out: config.oauth.redirect_sign_out.clone(),
            http,
        })
    }

    /// Point at another host serving the hosted UI endpoints.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sign-in page. `identity_provider` skips the provider chooser
    /// (`Facebook` or `Google`).
    pub fn login_url(&self, identity_provider: Option<&str>) -> Result<String, FrontendError> {
        let mut params = vec![
            ("client_id", self.client_id.as_str()),
            ("response_type", self.response_type.as_str()),
            ("scope", self.scope.as_str()),
            ("redirect_uri", self.redirect_sign_in.as_str()),
        ];
        if let Some(provider) = identity_provider {
            params.push(("identity_provider", provider));
        }
        self.url("/oauth2/authorize", &params)
    }

    pub fn logout_url(&self) -> Result<String, FrontendError> {
        self.url(
            "/logout",
            &[
                ("client_id", self.client_id.as_str()),
                ("logout_uri", self.redirect_sign_out.as_str()),
            ],
        )
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<String, FrontendError> {
        let query = serde_urlencoded::to_string(params)
            .map_err(|e| FrontendError::InvalidUrl(e.to_string()))?;
        Ok(format!("{}{}?{}", self.base_url, path, query))
    }

    /// Trade the `code` delivered to the sign-in redirect for a session.
    pub async fn exchange_code(&self, code: &str) -> Result<Session, FrontendError> {
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_sign_in.as_str()),
            ])
            .await?;
        tracing::info!("Signed in through the hosted UI");
        Ok(Session::from_token_response(response))
    }

    /// New access and ID tokens for an existing session. The refresh token
    /// is carried over when the endpoint does not rotate it.
    pub async fn refresh(&self, session: &Session) -> Result<Session, FrontendError> {
        let refresh_token = session.refresh_token().ok_or(FrontendError::NoSession)?;
        let mut response = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token.expose_secret()),
            ])
            .await?;

        if response.refresh_token.is_none() {
            response.refresh_token = Some(SecretString::new(
                refresh_token.expose_secret().to_string(),
            ));
        }
        Ok(Session::from_token_response(response))
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, FrontendError> {
        let url = format!("{}/oauth2/token", self.base_url);
        let response = self.http.post(&url).form(form).send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Token request failed");
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Token endpoint rejected the request");
            return Err(FrontendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }
}
