//! Session controller.
//!
//! Owns the session state and the active scope. All mutation goes through
//! `&mut self`, so a sign-out can never interleave with an in-flight profile
//! load.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast::{self, error::TryRecvError};

use branchdesk_auth::{
    Permission, PermissionCheck, Principal, SessionScope, SessionToken, authorize,
    validate_session,
};
use branchdesk_core::BranchId;
use branchdesk_navigation::{
    ActionEffect, MenuItem, QuickAction, RouteDecision, UiAction, available_quick_actions,
    filter_menu_tree, resolve_action, resolve_route,
};

use crate::backend::{AuthBackend, AuthStateChange, BackendError, Branch, Credentials};
use crate::error::SessionError;
use crate::signup::{FieldViolation, SignUpRequest, ValidationErrors, is_valid_email};
use crate::state::{AuthenticatedSession, SessionState};

/// Result of a successful sign-up call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The service signed the new account in.
    SignedIn,
    /// The account exists but must be confirmed before sign-in.
    ConfirmationRequired,
}

pub struct SessionController {
    backend: Arc<dyn AuthBackend>,
    changes: broadcast::Receiver<AuthStateChange>,
    state: SessionState,
    scope: SessionScope,
}

impl core::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state.name())
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// A controller starts unauthenticated; call [`SessionController::init`]
    /// to rehydrate a persisted session.
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let changes = backend.subscribe();
        Self {
            backend,
            changes,
            state: SessionState::Unauthenticated,
            scope: SessionScope::empty(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn scope(&self) -> SessionScope {
        self.scope
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.state.principal()
    }

    /// Active branches loaded for the principal's company.
    pub fn branches(&self) -> &[Branch] {
        self.state
            .session()
            .map(|s| s.branches.as_slice())
            .unwrap_or_default()
    }

    /// Rehydrate from the persisted session, if there is one.
    ///
    /// An expired or malformed persisted token is discarded and the session
    /// stays unauthenticated.
    pub async fn init(&mut self) -> Result<(), SessionError> {
        self.state = SessionState::Authenticating;

        let persisted = match self.backend.current_session().await {
            Ok(persisted) => persisted,
            Err(err) => {
                self.reset();
                return Err(err.into());
            }
        };

        let Some(token) = persisted else {
            self.reset();
            tracing::debug!("no persisted session");
            return Ok(());
        };

        if let Err(err) = validate_session(&token, Utc::now()) {
            tracing::info!(user_id = %token.user_id, error = %err, "discarding persisted session");
            if let Err(sign_out_err) = self.backend.sign_out(&token).await {
                tracing::warn!(error = %sign_out_err, "failed to clear persisted session");
            }
            self.reset();
            return Ok(());
        }

        self.establish(token).await
    }

    pub async fn sign_in(&mut self, credentials: &Credentials) -> Result<(), SessionError> {
        self.state = SessionState::Authenticating;
        match self.backend.sign_in(credentials).await {
            Ok(token) => self.establish(token).await,
            Err(err) => {
                self.reset();
                tracing::info!(email = %credentials.email, error = %err, "sign-in failed");
                Err(err.into())
            }
        }
    }

    /// Validate and submit a sign-up. Nothing reaches the service when the
    /// request is invalid.
    pub async fn sign_up(&mut self, request: &SignUpRequest) -> Result<SignUpOutcome, SessionError> {
        request.validate()?;

        self.state = SessionState::Authenticating;
        match self.backend.sign_up(request).await {
            Ok(Some(token)) => {
                self.establish(token).await?;
                Ok(SignUpOutcome::SignedIn)
            }
            Ok(None) => {
                self.reset();
                tracing::info!(email = %request.email, "sign-up pending confirmation");
                Ok(SignUpOutcome::ConfirmationRequired)
            }
            Err(err) => {
                self.reset();
                Err(err.into())
            }
        }
    }

    /// Sign out. The local session and scope are cleared even when the
    /// service call fails; the failure is still reported.
    ///
    /// Notifications queued before the sign-out are dropped so a stale
    /// `SignedIn` cannot bring the revoked session back.
    pub async fn sign_out(&mut self) -> Result<(), SessionError> {
        let token = match std::mem::take(&mut self.state) {
            SessionState::Authenticated(session) => Some(session.token),
            _ => None,
        };
        self.reset();
        self.changes = self.changes.resubscribe();

        let Some(token) = token else {
            return Ok(());
        };
        tracing::info!(user_id = %token.user_id, "signed out");
        self.backend.sign_out(&token).await.map_err(Into::into)
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), SessionError> {
        if !is_valid_email(email) {
            return Err(ValidationErrors(vec![FieldViolation {
                field: "email",
                message: "invalid email format",
            }])
            .into());
        }
        self.backend.reset_password(email).await.map_err(Into::into)
    }

    /// Replace the active branch without re-authenticating.
    ///
    /// Membership is not enforced: a branch outside the loaded list is
    /// accepted with a warning.
    pub fn switch_branch(&mut self, branch_id: BranchId) -> Result<(), SessionError> {
        let SessionState::Authenticated(session) = &self.state else {
            return Err(SessionError::NotAuthenticated);
        };
        if !session.knows_branch(branch_id) {
            tracing::warn!(
                %branch_id,
                company_id = ?self.scope.company_id,
                "switching to a branch not among the loaded branches"
            );
        }
        self.scope = self.scope.with_branch(branch_id);
        tracing::debug!(%branch_id, "branch switched");
        Ok(())
    }

    /// Sign out locally if the token has expired at `now`. Returns whether
    /// the session ended.
    pub fn check_expiry(&mut self, now: DateTime<Utc>) -> bool {
        let Some(session) = self.state.session() else {
            return false;
        };
        match validate_session(&session.token, now) {
            Ok(()) => false,
            Err(err) => {
                tracing::info!(user_id = %session.token.user_id, error = %err, "session ended");
                self.reset();
                true
            }
        }
    }

    /// Apply an auth-state notification from the service.
    pub async fn handle_auth_change(&mut self, change: AuthStateChange) -> Result<(), SessionError> {
        match change {
            AuthStateChange::SignedOut => {
                if self.is_authenticated() {
                    tracing::info!("signed out by service");
                }
                self.reset();
                Ok(())
            }
            AuthStateChange::TokenRefreshed(token) | AuthStateChange::SignedIn(token) => {
                if let SessionState::Authenticated(session) = &mut self.state {
                    if session.token.user_id == token.user_id {
                        session.token = token;
                        return Ok(());
                    }
                }
                self.state = SessionState::Authenticating;
                self.establish(token).await
            }
        }
    }

    /// Drain queued notifications without waiting. Returns how many were
    /// applied.
    pub async fn sync_auth_changes(&mut self) -> Result<usize, SessionError> {
        let mut applied = 0;
        loop {
            match self.changes.try_recv() {
                Ok(change) => {
                    self.handle_auth_change(change).await?;
                    applied += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth notifications dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return Ok(applied),
            }
        }
    }

    /// Wait for the next notification and apply it. Returns `false` once the
    /// service side of the channel has closed.
    pub async fn next_auth_change(&mut self) -> Result<bool, SessionError> {
        loop {
            match self.changes.recv().await {
                Ok(change) => {
                    self.handle_auth_change(change).await?;
                    return Ok(true);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "auth notifications dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(false),
            }
        }
    }

    /// Permission check for the current session. Without a profile nothing
    /// is granted.
    pub fn can(&self, permission: &str) -> bool {
        self.principal().allows(permission)
    }

    /// Full check: loaded profile, matching company scope, active account,
    /// role grant.
    pub fn authorize(&self, permission: &Permission) -> Result<(), SessionError> {
        let principal = self.principal().ok_or(SessionError::NotAuthenticated)?;
        authorize(principal, &self.scope, permission)?;
        Ok(())
    }

    pub fn visible_menu(&self, items: &[MenuItem]) -> Vec<MenuItem> {
        filter_menu_tree(&self.principal(), items)
    }

    pub fn quick_actions(&self) -> Vec<QuickAction> {
        available_quick_actions(&self.principal())
    }

    pub fn resolve_route(&self, path: &str) -> RouteDecision {
        if self.is_authenticated() {
            resolve_route(path, Some(&self.principal()))
        } else {
            resolve_route::<Option<&Principal>>(path, None)
        }
    }

    /// Check and perform a UI action. Session-level effects (branch switch,
    /// sign-out) are applied here; the effect is returned for the shell.
    pub async fn apply_action(&mut self, action: UiAction) -> Result<ActionEffect, SessionError> {
        let effect = resolve_action(&self.principal(), action)?;
        match effect {
            ActionEffect::SwitchBranch(branch_id) => self.switch_branch(branch_id)?,
            ActionEffect::SignOut => self.sign_out().await?,
            ActionEffect::Navigate(_) | ActionEffect::ToggleSidebar => {}
        }
        Ok(effect)
    }

    async fn establish(&mut self, token: SessionToken) -> Result<(), SessionError> {
        if let Err(err) = validate_session(&token, Utc::now()) {
            self.reset();
            return Err(err.into());
        }

        let principal = match self.backend.fetch_profile(&token).await {
            Ok(principal) if principal.id == token.user_id => Some(principal),
            Ok(principal) => {
                tracing::warn!(
                    user_id = %token.user_id,
                    profile_id = %principal.id,
                    "profile does not belong to session user; continuing without profile"
                );
                None
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %token.user_id,
                    error = %err,
                    "profile load failed; continuing without profile"
                );
                None
            }
        };

        let (scope, branches) = match &principal {
            Some(principal) => {
                let branches = self.load_branches(&token, principal).await;
                let mut scope = SessionScope::for_principal(principal);
                if scope.branch_id.is_none() {
                    if let Some(first) = branches.first() {
                        scope = scope.with_branch(first.id);
                    }
                }
                (scope, branches)
            }
            None => (SessionScope::empty(), Vec::new()),
        };

        tracing::info!(
            user_id = %token.user_id,
            role = ?principal.as_ref().map(|p| p.role),
            company_id = ?scope.company_id,
            branch_id = ?scope.branch_id,
            "session established"
        );

        self.scope = scope;
        self.state = SessionState::Authenticated(Box::new(AuthenticatedSession {
            token,
            principal,
            branches,
        }));
        Ok(())
    }

    async fn load_branches(&self, token: &SessionToken, principal: &Principal) -> Vec<Branch> {
        match self.backend.list_branches(token, principal.company_id).await {
            Ok(branches) => branches,
            Err(err) => {
                log_branch_failure(principal, &err);
                Vec::new()
            }
        }
    }

    fn reset(&mut self) {
        self.state = SessionState::Unauthenticated;
        self.scope = SessionScope::empty();
    }
}

fn log_branch_failure(principal: &Principal, err: &BackendError) {
    tracing::warn!(
        company_id = %principal.company_id,
        error = %err,
        "branch listing failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryAuthBackend;
    use crate::signup::sample_request;
    use branchdesk_auth::{PrincipalStatus, SystemRole};
    use branchdesk_core::{CompanyId, UserId};

    fn employee(company_id: CompanyId, branch_id: Option<BranchId>) -> Principal {
        Principal {
            id: UserId::new(),
            email: "sam@example.com".to_string(),
            display_name: "Sam".to_string(),
            role: SystemRole::Employee,
            company_id,
            branch_id,
            status: PrincipalStatus::Active,
        }
    }

    fn setup() -> (Arc<InMemoryAuthBackend>, SessionController) {
        let backend = Arc::new(InMemoryAuthBackend::new());
        let controller = SessionController::new(backend.clone());
        (backend, controller)
    }

    #[tokio::test]
    async fn starts_unauthenticated_with_empty_scope() {
        let (_, mut controller) = setup();
        assert_eq!(controller.state(), &SessionState::Unauthenticated);
        controller.init().await.unwrap();
        assert!(!controller.is_authenticated());
        assert!(controller.scope().is_empty());
    }

    #[tokio::test]
    async fn sign_in_loads_profile_and_scope() {
        let (backend, mut controller) = setup();
        let company = CompanyId::new();
        let branch = BranchId::new();
        backend.seed_account("Passw0rd!!x", employee(company, Some(branch)));

        controller
            .sign_in(&Credentials::new("sam@example.com", "Passw0rd!!x"))
            .await
            .unwrap();

        assert!(controller.is_authenticated());
        assert_eq!(controller.scope().company_id, Some(company));
        assert_eq!(controller.scope().branch_id, Some(branch));
        assert!(controller.can("pos.access"));
        assert!(!controller.can("users.write"));
    }

    #[tokio::test]
    async fn bad_password_stays_unauthenticated() {
        let (backend, mut controller) = setup();
        backend.seed_account("Passw0rd!!x", employee(CompanyId::new(), None));
        let err = controller
            .sign_in(&Credentials::new("sam@example.com", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidCredentials);
        assert_eq!(controller.state(), &SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn first_branch_is_selected_when_principal_has_none() {
        let (backend, mut controller) = setup();
        let company = CompanyId::new();
        let downtown = BranchId::new();
        for (id, name) in [(BranchId::new(), "Uptown"), (downtown, "Downtown")] {
            backend.add_branch(Branch {
                id,
                company_id: company,
                name: name.to_string(),
                city: String::new(),
                active: true,
            });
        }
        backend.seed_account("Passw0rd!!x", employee(company, None));

        controller
            .sign_in(&Credentials::new("sam@example.com", "Passw0rd!!x"))
            .await
            .unwrap();
        assert_eq!(controller.scope().branch_id, Some(downtown));
        assert_eq!(controller.branches().len(), 2);
    }

    #[tokio::test]
    async fn switch_branch_requires_session_and_accepts_unknown_branch() {
        let (_, mut controller) = setup();
        assert_eq!(
            controller.switch_branch(BranchId::new()),
            Err(SessionError::NotAuthenticated)
        );

        controller.sign_up(&sample_request("maria@example.com")).await.unwrap();
        let foreign = BranchId::new();
        controller.switch_branch(foreign).unwrap();
        assert_eq!(controller.scope().branch_id, Some(foreign));
    }

    #[tokio::test]
    async fn invalid_sign_up_never_reaches_service() {
        let (backend, mut controller) = setup();
        let mut request = sample_request("maria@example.com");
        request.password = "weak".to_string();
        let err = controller.sign_up(&request).await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(ref v) if v.has_field("password")));
        assert_eq!(backend.persisted_session(), None);
        assert_eq!(controller.state(), &SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn reset_password_checks_email_shape() {
        let (backend, controller) = setup();
        assert!(controller.reset_password("nope").await.is_err());
        controller.reset_password("maria@example.com").await.unwrap();
        assert_eq!(backend.password_reset_requests(), vec!["maria@example.com"]);
    }

    #[tokio::test]
    async fn routes_follow_session_state() {
        let (_, mut controller) = setup();
        assert_eq!(controller.resolve_route("/dashboard"), RouteDecision::Redirect("/signin"));

        controller.sign_up(&sample_request("maria@example.com")).await.unwrap();
        assert_eq!(controller.resolve_route("/signin"), RouteDecision::Redirect("/dashboard"));
        assert!(matches!(controller.resolve_route("/finance/coa"), RouteDecision::Render(_)));
    }

    #[tokio::test]
    async fn queued_sign_in_is_not_replayed_after_sign_out() {
        let (backend, mut controller) = setup();
        backend.seed_account("Passw0rd!!x", employee(CompanyId::new(), None));
        controller
            .sign_in(&Credentials::new("sam@example.com", "Passw0rd!!x"))
            .await
            .unwrap();
        controller.sign_out().await.unwrap();

        // only the service's own sign-out is left to apply
        assert!(controller.next_auth_change().await.unwrap());
        assert!(!controller.is_authenticated());
        assert!(controller.scope().is_empty());
        assert_eq!(controller.resolve_route("/dashboard"), RouteDecision::Redirect("/signin"));
        assert_eq!(controller.sync_auth_changes().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn next_auth_change_applies_service_sign_out() {
        let (backend, mut controller) = setup();
        backend.seed_account("Passw0rd!!x", employee(CompanyId::new(), None));
        controller
            .sign_in(&Credentials::new("sam@example.com", "Passw0rd!!x"))
            .await
            .unwrap();

        // the sign-in echo belongs to the live session and only refreshes it
        assert!(controller.next_auth_change().await.unwrap());
        assert!(controller.is_authenticated());

        backend.emit(AuthStateChange::SignedOut);
        assert!(controller.next_auth_change().await.unwrap());
        assert!(!controller.is_authenticated());
    }

    #[tokio::test]
    async fn sign_out_action_clears_session() {
        let (_, mut controller) = setup();
        controller.sign_up(&sample_request("maria@example.com")).await.unwrap();
        let effect = controller.apply_action(UiAction::SignOut).await.unwrap();
        assert_eq!(effect, ActionEffect::SignOut);
        assert!(!controller.is_authenticated());
        assert!(controller.scope().is_empty());
    }

    #[tokio::test]
    async fn authorize_uses_scope() {
        let (_, mut controller) = setup();
        let orders = Permission::from_static("orders.read");
        assert_eq!(controller.authorize(&orders), Err(SessionError::NotAuthenticated));

        controller.sign_up(&sample_request("maria@example.com")).await.unwrap();
        controller.authorize(&orders).unwrap();
    }
}
