use serde::Serialize;
use thiserror::Error;

use crate::permissions::{MODULE_WILDCARD_SUFFIX, Permission, WILDCARD};
use crate::principal::{Principal, PrincipalStatus, SessionScope};
use crate::roles::SystemRole;

/// Anything that can answer "is this permission granted?".
///
/// Implemented for built-in roles, stored role records and principals, so
/// menu/route/action filters can be written once.
pub trait PermissionCheck {
    fn allows(&self, permission: &str) -> bool;
}

impl<T: PermissionCheck + ?Sized> PermissionCheck for &T {
    fn allows(&self, permission: &str) -> bool {
        (**self).allows(permission)
    }
}

/// Absent access (no principal, no profile) grants nothing.
impl<T: PermissionCheck> PermissionCheck for Option<T> {
    fn allows(&self, permission: &str) -> bool {
        self.as_ref().is_some_and(|inner| inner.allows(permission))
    }
}

/// Which rule granted a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "rule", content = "module")]
pub enum Grant {
    /// The set contains `"*"`.
    Wildcard,
    /// The set contains the permission verbatim.
    Exact,
    /// The set contains `"<module>.*"` and the permission is `"<module>.<action>"`.
    ModuleWildcard(String),
}

/// Evaluate a permission against a granted set.
///
/// Rules, in order: full wildcard, exact match, module wildcard. Total and
/// side-effect free; malformed entries simply never match.
pub fn evaluate<S: AsRef<str>>(granted: &[S], permission: &str) -> Option<Grant> {
    if granted.iter().any(|p| p.as_ref() == WILDCARD) {
        return Some(Grant::Wildcard);
    }

    if granted.iter().any(|p| p.as_ref() == permission) {
        return Some(Grant::Exact);
    }

    granted.iter().find_map(|p| {
        let module = p.as_ref().strip_suffix(MODULE_WILDCARD_SUFFIX)?;
        permission
            .strip_prefix(module)?
            .starts_with('.')
            .then(|| Grant::ModuleWildcard(module.to_string()))
    })
}

/// Can a built-in role perform `permission`?
pub fn has_permission(role: SystemRole, permission: &str) -> bool {
    role.allows(permission)
}

/// Explanation of a permission decision, for audit output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub role: SystemRole,
    pub permission: String,
    pub grant: Option<Grant>,
}

impl Decision {
    pub fn granted(&self) -> bool {
        self.grant.is_some()
    }

    pub fn reason(&self) -> String {
        match &self.grant {
            Some(Grant::Wildcard) => format!("role '{}' holds the wildcard permission", self.role),
            Some(Grant::Exact) => format!("role '{}' is granted '{}'", self.role, self.permission),
            Some(Grant::ModuleWildcard(module)) => {
                format!("role '{}' is granted every action of module '{module}'", self.role)
            }
            None => format!("role '{}' is not granted '{}'", self.role, self.permission),
        }
    }
}

/// Explain why `role` is (or is not) granted `permission`.
pub fn explain(role: SystemRole, permission: &str) -> Decision {
    Decision {
        role,
        permission: permission.to_string(),
        grant: evaluate(role.permissions(), permission),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("company mismatch")]
    CompanyMismatch,

    #[error("principal is not active")]
    Inactive,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Authorize a principal within the active session scope.
///
/// - No IO
/// - No panics
/// - Scope must point at the principal's own company
pub fn authorize(
    principal: &Principal,
    scope: &SessionScope,
    required: &Permission,
) -> Result<(), AuthzError> {
    if scope.company_id != Some(principal.company_id) {
        return Err(AuthzError::CompanyMismatch);
    }

    if principal.status != PrincipalStatus::Active {
        return Err(AuthzError::Inactive);
    }

    if principal.allows(required.as_str()) {
        Ok(())
    } else {
        tracing::debug!(
            principal_id = %principal.id,
            role = %principal.role,
            permission = %required,
            "permission denied"
        );
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}
