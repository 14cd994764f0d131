use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    /// No signed-in user, or the session has expired. Callers send the user
    /// back to the hosted UI.
    #[error("No valid session")]
    NoSession,

    #[error("Unknown API endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("No signing credentials for {0}")]
    MissingCredentials(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl FrontendError {
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, FrontendError::NoSession)
            || matches!(self, FrontendError::Status { status: 401, .. })
    }
}
