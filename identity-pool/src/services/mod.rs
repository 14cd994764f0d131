pub mod admin;
pub mod error;
pub mod issuer;
pub mod pool;

pub use admin::{AdminError, CognitoUserPoolAdmin, UserAttribute, UserPoolAdmin};
pub use error::PoolError;
pub use issuer::TokenIssuer;
pub use pool::{LocalUserPool, SignUpRequest};
