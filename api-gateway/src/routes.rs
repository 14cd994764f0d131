//! Static route table: each declared route and the trust mechanism that
//! guards it.

use serde::Serialize;

pub const PRIVATE_IAM_PATH: &str = "/privateIAM";
pub const PRIVATE_JWT_PATH: &str = "/privateJWT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteAuthorization {
    /// Request signed with an access key for the gateway's region.
    SignedRequest,
    /// Bearer token issued by the configured user pool for the configured client.
    BearerToken,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteRule {
    pub path: &'static str,
    pub authorization: RouteAuthorization,
}

pub const ROUTES: &[RouteRule] = &[
    RouteRule {
        path: PRIVATE_IAM_PATH,
        authorization: RouteAuthorization::SignedRequest,
    },
    RouteRule {
        path: PRIVATE_JWT_PATH,
        authorization: RouteAuthorization::BearerToken,
    },
];

pub fn authorization_for(path: &str) -> Option<RouteAuthorization> {
    ROUTES
        .iter()
        .find(|rule| rule.path == path)
        .map(|rule| rule.authorization)
}
