//! Environment configuration.

use std::time::Duration;

use thiserror::Error;

pub const SERVICE_URL_VAR: &str = "BRANCHDESK_SERVICE_URL";
pub const ANON_KEY_VAR: &str = "BRANCHDESK_ANON_KEY";
pub const REQUEST_TIMEOUT_VAR: &str = "BRANCHDESK_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Connection settings for the hosted data/auth service.
#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub service_url: String,
    pub anon_key: String,
    /// `None` means requests never time out.
    pub request_timeout: Option<Duration>,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("service_url", &self.service_url)
            .field("anon_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let service_url = required(SERVICE_URL_VAR)?;
        if !(service_url.starts_with("http://") || service_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: SERVICE_URL_VAR,
                reason: "expected an http(s) URL".to_string(),
            });
        }
        let anon_key = required(ANON_KEY_VAR)?;

        let request_timeout = match lookup(REQUEST_TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            None => None,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid {
                        var: REQUEST_TIMEOUT_VAR,
                        reason: e.to_string(),
                    }
                })?;
                Some(Duration::from_secs(secs))
            }
        };

        Ok(Self {
            service_url: service_url.trim_end_matches('/').to_string(),
            anon_key,
            request_timeout,
        })
    }
}
