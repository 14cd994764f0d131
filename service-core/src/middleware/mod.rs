pub mod bearer;
pub mod metrics;
pub mod request_context;
pub mod signed_request;

pub use bearer::{bearer_token_middleware, AuthenticatedUser};
pub use request_context::{request_context_middleware, RequestContext, REQUEST_ID_HEADER};
pub use signed_request::{signed_request_middleware, SignedPrincipal, SignedRequestConfig};
