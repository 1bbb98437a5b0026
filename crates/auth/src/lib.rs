//! `branchdesk-auth` — pure authorization boundary.
//!
//! Permission catalog, built-in role table, the permission evaluator and the
//! principal/scope objects it is applied to. This crate is intentionally
//! decoupled from transport and storage.

pub mod authorize;
pub mod catalog;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod token;

pub use authorize::{
    AuthzError, Decision, Grant, PermissionCheck, authorize, evaluate, explain, has_permission,
};
pub use catalog::{CatalogError, CatalogViolation, PermissionCatalog};
pub use permissions::Permission;
pub use principal::{Principal, PrincipalStatus, SessionScope};
pub use roles::{Role, SystemRole, UnknownRole};
pub use token::{SessionToken, TokenValidationError, validate_session};
