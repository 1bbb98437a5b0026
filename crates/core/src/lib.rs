//! `branchdesk-core` — shared domain primitives.
//!
//! Identifiers and the domain error model used by every other crate. No IO.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{BranchId, CompanyId, ProductId, RoleId, UserId};
