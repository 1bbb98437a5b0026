use serde::{Deserialize, Serialize};

use branchdesk_core::{BranchId, CompanyId, UserId};

use crate::authorize::PermissionCheck;
use crate::roles::SystemRole;

/// Account status as recorded by the data service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

/// The authenticated user's loaded profile.
///
/// Created at sign-up alongside a company and its default branch. A principal
/// belongs to exactly one company; the branch reference is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: SystemRole,
    pub company_id: CompanyId,
    pub branch_id: Option<BranchId>,
    pub status: PrincipalStatus,
}

impl PermissionCheck for Principal {
    fn allows(&self, permission: &str) -> bool {
        self.role.allows(permission)
    }
}

/// The company/branch view a session is currently acting within.
///
/// Transient: swapped on branch selection, reset to empty on sign-out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionScope {
    pub company_id: Option<CompanyId>,
    pub branch_id: Option<BranchId>,
}

impl SessionScope {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn for_principal(principal: &Principal) -> Self {
        Self {
            company_id: Some(principal.company_id),
            branch_id: principal.branch_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.company_id.is_none() && self.branch_id.is_none()
    }

    pub fn with_branch(self, branch_id: BranchId) -> Self {
        Self {
            branch_id: Some(branch_id),
            ..self
        }
    }
}
