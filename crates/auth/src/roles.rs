use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use branchdesk_core::{CompanyId, RoleId};

use crate::authorize::{PermissionCheck, evaluate};
use crate::permissions::Permission;

/// Built-in roles shipped with every company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    Admin,
    BranchManager,
    Employee,
    Accountant,
    Auditor,
}

const ADMIN: &[&str] = &["*"];

const BRANCH_MANAGER: &[&str] = &[
    "dashboard.read",
    "branches.read",
    "products.read",
    "products.write",
    "inventory.read",
    "inventory.write",
    "inventory.transfer",
    "inventory.adjust",
    "sales.read",
    "sales.write",
    "pos.access",
    "orders.read",
    "orders.write",
    "quotes.read",
    "quotes.write",
    "invoices.read",
    "invoices.write",
    "customers.read",
    "customers.write",
    "reports.read",
    "users.read",
];

const EMPLOYEE: &[&str] = &[
    "dashboard.read",
    "pos.access",
    "orders.read",
    "products.read",
    "inventory.read",
    "customers.read",
];

const ACCOUNTANT: &[&str] = &[
    "dashboard.read",
    "finance.read",
    "finance.write",
    "accounting.read",
    "accounting.write",
    "invoices.read",
    "invoices.write",
    "reports.read",
    "reports.write",
    "customers.read",
    "suppliers.read",
];

const AUDITOR: &[&str] = &[
    "dashboard.read",
    "finance.read",
    "accounting.read",
    "reports.read",
    "audit.read",
    "orders.read",
    "invoices.read",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl SystemRole {
    pub const ALL: [SystemRole; 5] = [
        SystemRole::Admin,
        SystemRole::BranchManager,
        SystemRole::Employee,
        SystemRole::Accountant,
        SystemRole::Auditor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemRole::Admin => "admin",
            SystemRole::BranchManager => "branch_manager",
            SystemRole::Employee => "employee",
            SystemRole::Accountant => "accountant",
            SystemRole::Auditor => "auditor",
        }
    }

    /// Statically assigned permission set.
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            SystemRole::Admin => ADMIN,
            SystemRole::BranchManager => BRANCH_MANAGER,
            SystemRole::Employee => EMPLOYEE,
            SystemRole::Accountant => ACCOUNTANT,
            SystemRole::Auditor => AUDITOR,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SystemRole::Admin => "Full administrator with all permissions",
            SystemRole::BranchManager => "Runs a branch: sales, stock, customers and staff listing",
            SystemRole::Employee => "Front-line staff with POS and read access",
            SystemRole::Accountant => "Finance, accounting and invoicing",
            SystemRole::Auditor => "Read-only access to financial records and audit logs",
        }
    }
}

impl core::fmt::Display for SystemRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SystemRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl PermissionCheck for SystemRole {
    fn allows(&self, permission: &str) -> bool {
        evaluate(self.permissions(), permission).is_some()
    }
}

/// A role record as stored by the data service.
///
/// System roles are evaluated against the static table regardless of what
/// the stored permission list says; company-defined roles are evaluated
/// against their stored list with the same wildcard rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub company_id: CompanyId,
    pub name: String,
    pub permissions: Vec<Permission>,
    pub is_system: bool,
}

impl Role {
    /// Materialize a built-in role for a company.
    pub fn system(id: RoleId, company_id: CompanyId, role: SystemRole) -> Self {
        Self {
            id,
            company_id,
            name: role.as_str().to_string(),
            permissions: role
                .permissions()
                .iter()
                .copied()
                .map(Permission::from_static)
                .collect(),
            is_system: true,
        }
    }

    pub fn system_role(&self) -> Option<SystemRole> {
        if self.is_system {
            self.name.parse().ok()
        } else {
            None
        }
    }
}

impl PermissionCheck for Role {
    fn allows(&self, permission: &str) -> bool {
        match self.system_role() {
            Some(role) => role.allows(permission),
            None => evaluate(&self.permissions, permission).is_some(),
        }
    }
}
