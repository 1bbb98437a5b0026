use thiserror::Error;

use branchdesk_auth::{AuthzError, TokenValidationError};

use crate::backend::BackendError;
use crate::signup::ValidationErrors;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("session rejected: {0}")]
    Token(#[from] TokenValidationError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("auth service error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::InvalidCredentials => SessionError::InvalidCredentials,
            other => SessionError::Backend(other),
        }
    }
}
