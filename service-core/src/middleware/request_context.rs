use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Format of `requestContext.time` as delivered by the API gateway,
/// e.g. `12/Mar/2020:19:03:58 +0000`.
pub const REQUEST_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Server-side facts about a request, stamped before any handler or
/// authorizer runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: String,
    pub time: String,
    pub time_epoch: i64,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            request_id: request_id.into(),
            time: received_at.format(REQUEST_TIME_FORMAT).to_string(),
            time_epoch: received_at.timestamp_millis(),
        }
    }
}

pub async fn request_context_middleware(mut req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        req.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    req.extensions_mut()
        .insert(RequestContext::new(request_id.clone(), Utc::now()));

    let mut response = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestContext>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "Request context missing from request extensions"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_uses_gateway_format() {
        let at = Utc.with_ymd_and_hms(2020, 3, 12, 19, 3, 58).unwrap();
        let ctx = RequestContext::new("req-1", at);
        assert_eq!(ctx.time, "12/Mar/2020:19:03:58 +0000");
        assert_eq!(ctx.time_epoch, 1584039838000);
    }
}
