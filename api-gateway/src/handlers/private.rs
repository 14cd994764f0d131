use axum::{http::header, response::IntoResponse};
use service_core::middleware::RequestContext;

pub async fn private_iam(ctx: RequestContext) -> impl IntoResponse {
    received_at(&ctx)
}

pub async fn private_jwt(ctx: RequestContext) -> impl IntoResponse {
    received_at(&ctx)
}

fn received_at(ctx: &RequestContext) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain")],
        format!("Your request was received at {}.", ctx.time),
    )
}
