//! Session lifecycle states.

use branchdesk_auth::{Principal, SessionToken};

use crate::backend::Branch;

/// An established session.
///
/// `principal` is `None` when the profile could not be loaded; such a
/// session is authenticated but holds no permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub token: SessionToken,
    pub principal: Option<Principal>,
    /// Active branches of the principal's company, ordered by name.
    pub branches: Vec<Branch>,
}

impl AuthenticatedSession {
    pub fn has_profile(&self) -> bool {
        self.principal.is_some()
    }

    pub fn knows_branch(&self, branch_id: branchdesk_core::BranchId) -> bool {
        self.branches.iter().any(|b| b.id == branch_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    /// A sign-in, sign-up or rehydration is in flight.
    Authenticating,
    Authenticated(Box<AuthenticatedSession>),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&AuthenticatedSession> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.session().and_then(|s| s.principal.as_ref())
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated(_) => "authenticated",
        }
    }
}
