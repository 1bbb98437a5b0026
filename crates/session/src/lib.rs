//! `branchdesk-session` — session lifecycle against the data/auth service.
//!
//! The [`AuthBackend`] trait is the seam to the hosted service; the
//! [`SessionController`] owns the session state and scope and is the only
//! thing that mutates them.

pub mod app;
pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;
pub mod signup;
pub mod state;

pub use app::{Application, StartupError};
pub use backend::{AuthBackend, AuthStateChange, BackendError, Branch, Credentials};
pub use config::{AppConfig, ConfigError};
pub use controller::{SessionController, SignUpOutcome};
pub use error::SessionError;
#[cfg(feature = "http")]
pub use http::HttpAuthBackend;
pub use memory::InMemoryAuthBackend;
pub use signup::{FieldViolation, NewBranch, NewCompany, SignUpRequest, ValidationErrors};
pub use state::{AuthenticatedSession, SessionState};
