pub mod health;
pub mod private;

pub use health::{health_check, metrics};
pub use private::{private_iam, private_jwt};

use axum::http::Uri;
use service_core::error::AppError;

/// Undeclared routes are refused outright.
pub async fn forbidden(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "Rejected request for undeclared route");
    AppError::Forbidden(anyhow::anyhow!("Forbidden"))
}
