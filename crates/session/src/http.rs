//! HTTP backend for the hosted data/auth service.
//!
//! Speaks the service's REST dialect: `/auth/v1/*` for identity and
//! `/rest/v1/<table>` for profile and branch rows. The persisted session is
//! kept in memory; callers seed it with [`HttpAuthBackend::with_session`].

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;

use branchdesk_auth::{Principal, PrincipalStatus, SessionToken, SystemRole};
use branchdesk_core::{BranchId, CompanyId, UserId};

use crate::backend::{AuthBackend, AuthStateChange, BackendError, Branch, Credentials};
use crate::config::AppConfig;
use crate::signup::SignUpRequest;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    user: UserRef,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    id: UserId,
}

/// Sign-up answers with a session, or with the bare user when confirmation
/// is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    Pending { id: UserId },
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: UserId,
    email: String,
    full_name: String,
    role: String,
    company_id: CompanyId,
    branch_id: Option<BranchId>,
    #[serde(default)]
    status: PrincipalStatus,
}

impl TryFrom<ProfileRow> for Principal {
    type Error = BackendError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role = SystemRole::from_str(&row.role).map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(Principal {
            id: row.id,
            email: row.email,
            display_name: row.full_name,
            role,
            company_id: row.company_id,
            branch_id: row.branch_id,
            status: row.status,
        })
    }
}

impl TokenResponse {
    fn into_session(self) -> SessionToken {
        let now = Utc::now();
        SessionToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user_id: self.user.id,
            issued_at: now,
            expires_at: now + Duration::seconds(self.expires_in),
        }
    }
}

#[derive(Debug)]
pub struct HttpAuthBackend {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: Mutex<Option<SessionToken>>,
    changes: broadcast::Sender<AuthStateChange>,
}

impl HttpAuthBackend {
    pub fn new(config: &AppConfig) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);

        Ok(Self {
            client,
            base_url: config.service_url.clone(),
            anon_key: config.anon_key.clone(),
            session: Mutex::new(None),
            changes,
        })
    }

    /// Seed the persisted session (e.g. read back from local storage).
    pub fn with_session(self, token: SessionToken) -> Self {
        *self.stored() = Some(token);
        self
    }

    fn stored(&self) -> MutexGuard<'_, Option<SessionToken>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
    }

    fn get(&self, path: &str, token: &SessionToken) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(&token.access_token)
    }

    fn remember(&self, token: &SessionToken) {
        *self.stored() = Some(token.clone());
        let _ = self.changes.send(AuthStateChange::SignedIn(token.clone()));
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
    let resp = request
        .send()
        .await
        .map_err(|e| BackendError::Network(e.to_string()))?;

    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(BackendError::Unauthorized);
    }
    Err(BackendError::Api(status.as_u16(), resp.text().await.unwrap_or_default()))
}

async fn parse<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, BackendError> {
    resp.json().await.map_err(|e| BackendError::Parse(e.to_string()))
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<SessionToken>, BackendError> {
        let body = json!({
            "email": request.email,
            "password": request.password,
            "data": {
                "full_name": request.full_name,
                "company_name": request.company.name,
                "industry": request.company.industry,
                "branch_name": request.branch.name,
                "address": request.branch.address,
                "city": request.branch.city,
                "state": request.branch.state,
                "postal_code": request.branch.postal_code,
                "phone": request.branch.phone,
            }
        });

        let resp = match send(self.post("/auth/v1/signup").json(&body)).await {
            Err(BackendError::Api(422, _)) => return Err(BackendError::EmailTaken),
            other => other?,
        };

        match parse::<SignUpResponse>(resp).await? {
            SignUpResponse::Session(session) => {
                let token = session.into_session();
                self.remember(&token);
                Ok(Some(token))
            }
            SignUpResponse::Pending { id } => {
                tracing::debug!(user_id = %id, "sign-up awaiting confirmation");
                Ok(None)
            }
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<SessionToken, BackendError> {
        let body = json!({ "email": credentials.email, "password": credentials.password });
        let resp = match send(self.post("/auth/v1/token?grant_type=password").json(&body)).await {
            Err(BackendError::Api(400, _)) | Err(BackendError::Unauthorized) => {
                return Err(BackendError::InvalidCredentials);
            }
            other => other?,
        };

        let token = parse::<TokenResponse>(resp).await?.into_session();
        self.remember(&token);
        Ok(token)
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), BackendError> {
        let result = send(
            self.post("/auth/v1/logout")
                .bearer_auth(&token.access_token),
        )
        .await;

        *self.stored() = None;
        let _ = self.changes.send(AuthStateChange::SignedOut);
        result.map(|_| ())
    }

    async fn current_session(&self) -> Result<Option<SessionToken>, BackendError> {
        Ok(self.stored().clone())
    }

    async fn reset_password(&self, email: &str) -> Result<(), BackendError> {
        send(self.post("/auth/v1/recover").json(&json!({ "email": email }))).await?;
        Ok(())
    }

    async fn fetch_profile(&self, token: &SessionToken) -> Result<Principal, BackendError> {
        let path = format!("/rest/v1/users?id=eq.{}&select=*", token.user_id);
        let rows: Vec<ProfileRow> = parse(send(self.get(&path, token)).await?).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("profile for user {}", token.user_id)))?
            .try_into()
    }

    async fn list_branches(
        &self,
        token: &SessionToken,
        company_id: CompanyId,
    ) -> Result<Vec<Branch>, BackendError> {
        let path = format!(
            "/rest/v1/branches?company_id=eq.{company_id}&active=eq.true&order=name.asc&select=id,company_id,name,city,active"
        );
        parse(send(self.get(&path, token)).await?).await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthStateChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_row_maps_to_principal() {
        let row: ProfileRow = serde_json::from_value(json!({
            "id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "email": "maria@example.com",
            "full_name": "Maria Lopez",
            "role": "branch_manager",
            "company_id": "01890a5d-ac96-774b-bcce-b302099a8058",
            "branch_id": null
        }))
        .unwrap();
        let principal = Principal::try_from(row).unwrap();
        assert_eq!(principal.role, SystemRole::BranchManager);
        assert_eq!(principal.status, PrincipalStatus::Active);
        assert_eq!(principal.branch_id, None);
    }

    #[test]
    fn unknown_role_is_a_parse_error() {
        let row: ProfileRow = serde_json::from_value(json!({
            "id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "email": "maria@example.com",
            "full_name": "Maria Lopez",
            "role": "superuser",
            "company_id": "01890a5d-ac96-774b-bcce-b302099a8058",
            "branch_id": null
        }))
        .unwrap();
        assert!(matches!(Principal::try_from(row), Err(BackendError::Parse(_))));
    }

    #[test]
    fn sign_up_response_shapes() {
        let pending: SignUpResponse = serde_json::from_value(json!({
            "id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "email": "maria@example.com"
        }))
        .unwrap();
        assert!(matches!(pending, SignUpResponse::Pending { .. }));

        let session: SignUpResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": { "id": "01890a5d-ac96-774b-bcce-b302099a8057" }
        }))
        .unwrap();
        let SignUpResponse::Session(token) = session else {
            panic!("expected session");
        };
        let token = token.into_session();
        assert_eq!(token.expires_at - token.issued_at, Duration::seconds(3600));
    }
}
