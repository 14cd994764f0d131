pub mod auth;
pub mod user;
pub mod well_known;

use axum::response::IntoResponse;
use service_core::observability::get_metrics;

pub async fn metrics() -> impl IntoResponse {
    get_metrics()
}
