//! Boundary to the managed data/auth service.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use branchdesk_auth::{Principal, SessionToken};
use branchdesk_core::{BranchId, CompanyId};

use crate::signup::SignUpRequest;

/// Email/password pair for sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A branch row as stored by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub company_id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub city: String,
    pub active: bool,
}

/// Auth-state notification pushed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStateChange {
    SignedIn(SessionToken),
    TokenRefreshed(SessionToken),
    SignedOut,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailTaken,
    #[error("session rejected by service")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("service error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Operations the session layer needs from the hosted service.
///
/// Calls are plain request/response; implementations do not retry.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Create company, default branch and admin principal. Returns a
    /// session when the service signs the new account in immediately, or
    /// `None` when email confirmation is pending.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<SessionToken>, BackendError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<SessionToken, BackendError>;

    async fn sign_out(&self, token: &SessionToken) -> Result<(), BackendError>;

    /// The persisted session, if any.
    async fn current_session(&self) -> Result<Option<SessionToken>, BackendError>;

    async fn reset_password(&self, email: &str) -> Result<(), BackendError>;

    /// Profile row of the token's user.
    async fn fetch_profile(&self, token: &SessionToken) -> Result<Principal, BackendError>;

    /// Active branches of `company_id`, ordered by name.
    async fn list_branches(
        &self,
        token: &SessionToken,
        company_id: CompanyId,
    ) -> Result<Vec<Branch>, BackendError>;

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange>;
}
