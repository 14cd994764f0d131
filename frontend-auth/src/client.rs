use chrono::Utc;
use reqwest::{Client, Method, Url};
use secrecy::{ExposeSecret, SecretString};
use service_core::utils::signature::{
    authorization_header, credential_scope, generate_signature, SigningInput, NONCE_HEADER,
    TIMESTAMP_HEADER,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::{ApiEndpoint, ClientConfiguration, EndpointAuthorization};
use crate::error::FrontendError;
use crate::session::SessionProvider;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials used to sign calls to signed-request endpoints.
#[derive(Clone)]
pub struct SigningCredentials {
    pub access_key_id: String,
    pub secret: SecretString,
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("access_key_id", &self.access_key_id)
            .finish_non_exhaustive()
    }
}

/// Calls the named API endpoints of the client configuration.
pub struct ApiClient {
    http: Client,
    endpoints: Vec<ApiEndpoint>,
    credentials: Option<SigningCredentials>,
    session: Arc<dyn SessionProvider>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfiguration,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, FrontendError> {
        let http = Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            http,
            endpoints: config.api.endpoints.clone(),
            credentials: None,
            session,
        })
    }

    pub fn with_signing_credentials(mut self, credentials: SigningCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// `GET <endpoint><path>` on the named API, returning the response body.
    pub async fn get(&self, api_name: &str, path: &str) -> Result<String, FrontendError> {
        let endpoint = self
            .endpoints
            .iter()
            .find(|e| e.name == api_name)
            .ok_or_else(|| FrontendError::UnknownEndpoint(api_name.to_string()))?;

        let url = endpoint_url(&endpoint.endpoint, path)?;
        let headers = self.authorization_headers(endpoint, &Method::GET, &url).await?;

        let mut request = self.http.get(url.clone());
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "API request failed");
            e
        })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(api = %api_name, status = status.as_u16(), "API call rejected");
            return Err(FrontendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// Resolved before anything is sent: a bearer endpoint without a valid
    /// session fails here.
    async fn authorization_headers(
        &self,
        endpoint: &ApiEndpoint,
        method: &Method,
        url: &Url,
    ) -> Result<Vec<(&'static str, String)>, FrontendError> {
        match endpoint.authorization {
            EndpointAuthorization::BearerToken => {
                let session = self.session.current_session().await?;
                Ok(vec![("Authorization", session.bearer_header())])
            }
            EndpointAuthorization::SignedRequest => {
                let credentials = self
                    .credentials
                    .as_ref()
                    .ok_or_else(|| FrontendError::MissingCredentials(endpoint.name.clone()))?;

                let timestamp = Utc::now().timestamp();
                let nonce = Uuid::new_v4().to_string();
                let scope = credential_scope(&endpoint.region);
                let signature = generate_signature(
                    credentials.secret.expose_secret(),
                    &scope,
                    &SigningInput {
                        method: method.as_str(),
                        path: url.path(),
                        query: url.query().unwrap_or(""),
                        timestamp,
                        nonce: &nonce,
                        body: b"",
                    },
                )?;

                Ok(vec![
                    (
                        "Authorization",
                        authorization_header(&credentials.access_key_id, &scope, &signature),
                    ),
                    (TIMESTAMP_HEADER, timestamp.to_string()),
                    (NONCE_HEADER, nonce),
                ])
            }
        }
    }
}

fn endpoint_url(endpoint: &str, path: &str) -> Result<Url, FrontendError> {
    let joined = format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| FrontendError::InvalidUrl(format!("{}: {}", joined, e)))
}
