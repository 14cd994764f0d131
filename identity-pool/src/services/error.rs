use service_core::error::AppError;
use thiserror::Error;

use crate::triggers::TriggerError;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("User already exists")]
    UsernameExists,

    #[error("An account with the given {0} already exists")]
    AliasExists(&'static str),

    #[error("Password does not conform to policy")]
    InvalidPassword,

    #[error("User does not exist")]
    UserNotFound,

    #[error("Incorrect username or password")]
    NotAuthorized,

    #[error("User is not confirmed")]
    UserNotConfirmed,

    #[error("A client attempted to write unauthorized attribute '{0}'")]
    AttributeNotWritable(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    Trigger(#[from] TriggerError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PoolError> for AppError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::UsernameExists | PoolError::AliasExists(_) => {
                AppError::Conflict(anyhow::Error::new(err))
            }
            PoolError::InvalidPassword => AppError::BadRequest(anyhow::Error::new(err)),
            PoolError::UserNotFound => AppError::NotFound(anyhow::Error::new(err)),
            PoolError::NotAuthorized | PoolError::UserNotConfirmed | PoolError::InvalidToken => {
                AppError::Unauthorized(anyhow::Error::new(err))
            }
            PoolError::AttributeNotWritable(_) => AppError::Forbidden(anyhow::Error::new(err)),
            PoolError::Trigger(e) => AppError::BadGateway(e.to_string()),
            PoolError::Internal(e) => AppError::InternalError(e),
        }
    }
}
