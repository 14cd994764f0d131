use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use service_core::observability::get_metrics;

use crate::GatewayState;

pub async fn health_check(State(state): State<GatewayState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": state.service_name,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn metrics() -> impl IntoResponse {
    get_metrics()
}
