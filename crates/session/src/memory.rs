//! In-memory auth backend for tests/dev.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::broadcast;

use branchdesk_auth::{Principal, PrincipalStatus, SessionToken, SystemRole};
use branchdesk_core::{BranchId, CompanyId, UserId};

use crate::backend::{AuthBackend, AuthStateChange, BackendError, Branch, Credentials};
use crate::signup::SignUpRequest;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
struct Account {
    password: String,
    user_id: UserId,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    profiles: HashMap<UserId, Principal>,
    branches: Vec<Branch>,
    issued: HashMap<String, UserId>,
    persisted: Option<SessionToken>,
    reset_requests: Vec<String>,
    fail_profile_loads: bool,
    fail_branch_loads: bool,
    next_token: u64,
}

/// In-process stand-in for the hosted service.
///
/// - No IO
/// - Tokens are opaque counters, valid for the configured TTL
/// - Notifications are broadcast on every sign-in/out, like the real service
#[derive(Debug)]
pub struct InMemoryAuthBackend {
    state: Mutex<State>,
    ttl: Duration,
    changes: broadcast::Sender<AuthStateChange>,
}

impl Default for InMemoryAuthBackend {
    fn default() -> Self {
        Self::with_ttl(Duration::hours(1))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl InMemoryAuthBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(State::default()),
            ttl,
            changes,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an account whose profile is `principal`.
    pub fn seed_account(&self, password: &str, principal: Principal) {
        let mut state = self.state();
        state.accounts.insert(
            normalize_email(&principal.email),
            Account {
                password: password.to_string(),
                user_id: principal.id,
            },
        );
        state.profiles.insert(principal.id, principal);
    }

    /// Register an account without a profile row.
    pub fn seed_account_without_profile(&self, email: &str, password: &str) -> UserId {
        let user_id = UserId::new();
        self.state().accounts.insert(
            normalize_email(email),
            Account {
                password: password.to_string(),
                user_id,
            },
        );
        user_id
    }

    pub fn add_branch(&self, branch: Branch) {
        self.state().branches.push(branch);
    }

    /// Make profile fetches fail with a network error.
    pub fn set_profile_failure(&self, fail: bool) {
        self.state().fail_profile_loads = fail;
    }

    /// Make branch listings fail with a network error.
    pub fn set_branch_failure(&self, fail: bool) {
        self.state().fail_branch_loads = fail;
    }

    /// Store a session as if it survived a restart.
    pub fn persist_session(&self, token: SessionToken) {
        let mut state = self.state();
        state.issued.insert(token.access_token.clone(), token.user_id);
        state.persisted = Some(token);
    }

    pub fn persisted_session(&self) -> Option<SessionToken> {
        self.state().persisted.clone()
    }

    pub fn password_reset_requests(&self) -> Vec<String> {
        self.state().reset_requests.clone()
    }

    /// Push a notification as if it came from the service.
    pub fn emit(&self, change: AuthStateChange) {
        if let AuthStateChange::SignedOut = change {
            let mut state = self.state();
            state.persisted = None;
            state.issued.clear();
        }
        let _ = self.changes.send(change);
    }

    /// Issue a fresh token for `user_id` without a notification.
    pub fn issue_token(&self, user_id: UserId) -> SessionToken {
        let mut state = self.state();
        self.issue_locked(&mut state, user_id)
    }

    fn issue_locked(&self, state: &mut State, user_id: UserId) -> SessionToken {
        state.next_token += 1;
        let now = Utc::now();
        let token = SessionToken {
            access_token: format!("mem-access-{}", state.next_token),
            refresh_token: Some(format!("mem-refresh-{}", state.next_token)),
            user_id,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        state.issued.insert(token.access_token.clone(), user_id);
        state.persisted = Some(token.clone());
        token
    }

    fn authorize_token(state: &State, token: &SessionToken) -> Result<UserId, BackendError> {
        state
            .issued
            .get(&token.access_token)
            .copied()
            .filter(|user_id| *user_id == token.user_id)
            .ok_or(BackendError::Unauthorized)
    }
}

#[async_trait]
impl AuthBackend for InMemoryAuthBackend {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<SessionToken>, BackendError> {
        let email = normalize_email(&request.email);
        let token = {
            let mut state = self.state();
            if state.accounts.contains_key(&email) {
                return Err(BackendError::EmailTaken);
            }

            let company_id = CompanyId::new();
            let branch_id = BranchId::new();
            let user_id = UserId::new();

            state.branches.push(Branch {
                id: branch_id,
                company_id,
                name: request.branch.name.clone(),
                city: request.branch.city.clone(),
                active: true,
            });
            state.profiles.insert(
                user_id,
                Principal {
                    id: user_id,
                    email: email.clone(),
                    display_name: request.full_name.clone(),
                    role: SystemRole::Admin,
                    company_id,
                    branch_id: Some(branch_id),
                    status: PrincipalStatus::Active,
                },
            );
            state.accounts.insert(
                email,
                Account {
                    password: request.password.clone(),
                    user_id,
                },
            );
            self.issue_locked(&mut state, user_id)
        };

        let _ = self.changes.send(AuthStateChange::SignedIn(token.clone()));
        Ok(Some(token))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SessionToken, BackendError> {
        let token = {
            let mut state = self.state();
            let user_id = state
                .accounts
                .get(&normalize_email(&credentials.email))
                .filter(|account| account.password == credentials.password)
                .map(|account| account.user_id)
                .ok_or(BackendError::InvalidCredentials)?;
            self.issue_locked(&mut state, user_id)
        };

        let _ = self.changes.send(AuthStateChange::SignedIn(token.clone()));
        Ok(token)
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), BackendError> {
        {
            let mut state = self.state();
            state.issued.remove(&token.access_token);
            if state
                .persisted
                .as_ref()
                .is_some_and(|p| p.access_token == token.access_token)
            {
                state.persisted = None;
            }
        }
        let _ = self.changes.send(AuthStateChange::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<SessionToken>, BackendError> {
        Ok(self.state().persisted.clone())
    }

    async fn reset_password(&self, email: &str) -> Result<(), BackendError> {
        // Unknown addresses succeed too, so callers cannot probe for accounts.
        self.state().reset_requests.push(normalize_email(email));
        Ok(())
    }

    async fn fetch_profile(&self, token: &SessionToken) -> Result<Principal, BackendError> {
        let state = self.state();
        let user_id = Self::authorize_token(&state, token)?;
        if state.fail_profile_loads {
            return Err(BackendError::Network("profile service unavailable".to_string()));
        }
        state
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("profile for user {user_id}")))
    }

    async fn list_branches(
        &self,
        token: &SessionToken,
        company_id: CompanyId,
    ) -> Result<Vec<Branch>, BackendError> {
        let state = self.state();
        Self::authorize_token(&state, token)?;
        if state.fail_branch_loads {
            return Err(BackendError::Network("branch listing unavailable".to_string()));
        }
        let mut branches: Vec<Branch> = state
            .branches
            .iter()
            .filter(|b| b.company_id == company_id && b.active)
            .cloned()
            .collect();
        branches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(branches)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signup::sample_request;

    #[tokio::test]
    async fn sign_up_creates_admin_with_default_branch() {
        let backend = InMemoryAuthBackend::new();
        let token = backend
            .sign_up(&sample_request("maria@example.com"))
            .await
            .unwrap()
            .unwrap();

        let profile = backend.fetch_profile(&token).await.unwrap();
        assert_eq!(profile.role, SystemRole::Admin);
        let branches = backend.list_branches(&token, profile.company_id).await.unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(Some(branches[0].id), profile.branch_id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let backend = InMemoryAuthBackend::new();
        backend.sign_up(&sample_request("maria@example.com")).await.unwrap();
        assert_eq!(
            backend.sign_up(&sample_request("Maria@Example.com")).await,
            Err(BackendError::EmailTaken)
        );
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let backend = InMemoryAuthBackend::new();
        backend.sign_up(&sample_request("maria@example.com")).await.unwrap();
        let result = backend
            .sign_in(&Credentials::new("maria@example.com", "nope"))
            .await;
        assert_eq!(result, Err(BackendError::InvalidCredentials));
    }

    #[tokio::test]
    async fn signed_out_token_is_rejected() {
        let backend = InMemoryAuthBackend::new();
        let token = backend
            .sign_up(&sample_request("maria@example.com"))
            .await
            .unwrap()
            .unwrap();
        backend.sign_out(&token).await.unwrap();
        assert_eq!(backend.fetch_profile(&token).await, Err(BackendError::Unauthorized));
        assert_eq!(backend.current_session().await, Ok(None));
    }

    #[tokio::test]
    async fn branches_are_active_and_sorted() {
        let backend = InMemoryAuthBackend::new();
        let token = backend
            .sign_up(&sample_request("maria@example.com"))
            .await
            .unwrap()
            .unwrap();
        let company_id = backend.fetch_profile(&token).await.unwrap().company_id;
        for (name, active) in [("Uptown", true), ("Closed", false), ("Downtown", true)] {
            backend.add_branch(Branch {
                id: BranchId::new(),
                company_id,
                name: name.to_string(),
                city: String::new(),
                active,
            });
        }
        let names: Vec<_> = backend
            .list_branches(&token, company_id)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Downtown", "Main Branch", "Uptown"]);
    }

    #[tokio::test]
    async fn notifications_follow_sign_in_and_out() {
        let backend = InMemoryAuthBackend::new();
        let mut rx = backend.subscribe();
        let token = backend
            .sign_up(&sample_request("maria@example.com"))
            .await
            .unwrap()
            .unwrap();
        backend.sign_out(&token).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), AuthStateChange::SignedIn(token));
        assert_eq!(rx.recv().await.unwrap(), AuthStateChange::SignedOut);
    }
}
