use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use branchdesk_core::UserId;

/// Persisted session issued by the data/auth service.
///
/// The access token is opaque to this crate; only its owner and validity
/// window are interpreted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    pub refresh_token: Option<String>,

    /// Subject the token was issued to.
    pub user_id: UserId,

    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl core::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionToken")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("user_id", &self.user_id)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("empty access token")]
    Empty,
}

/// Deterministically validate a persisted session against `now`.
pub fn validate_session(token: &SessionToken, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if token.access_token.trim().is_empty() {
        return Err(TokenValidationError::Empty);
    }
    if token.expires_at <= token.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < token.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= token.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(issued_at: DateTime<Utc>, ttl: Duration) -> SessionToken {
        SessionToken {
            access_token: "opaque".to_string(),
            refresh_token: Some("refresh".to_string()),
            user_id: UserId::new(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn valid_inside_window() {
        let now = Utc::now();
        let t = token(now - Duration::minutes(1), Duration::hours(1));
        assert_eq!(validate_session(&t, now), Ok(()));
    }

    #[test]
    fn expired_at_boundary() {
        let now = Utc::now();
        let t = token(now - Duration::hours(1), Duration::hours(1));
        assert_eq!(validate_session(&t, now), Err(TokenValidationError::Expired));
    }

    #[test]
    fn future_issue_is_rejected() {
        let now = Utc::now();
        let t = token(now + Duration::minutes(5), Duration::hours(1));
        assert_eq!(validate_session(&t, now), Err(TokenValidationError::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let t = token(now, Duration::seconds(0));
        assert_eq!(validate_session(&t, now), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn blank_token_is_rejected() {
        let now = Utc::now();
        let mut t = token(now - Duration::minutes(1), Duration::hours(1));
        t.access_token = "  ".to_string();
        assert_eq!(validate_session(&t, now), Err(TokenValidationError::Empty));
    }

    #[test]
    fn debug_redacts_secrets() {
        let t = token(Utc::now(), Duration::hours(1));
        let rendered = format!("{t:?}");
        assert!(!rendered.contains("opaque"));
        assert!(!rendered.contains("\"refresh\""));
    }
}
