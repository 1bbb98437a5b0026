//! Global permission catalog.
//!
//! Every permission string referenced by a role table, menu entry, route or
//! UI action must resolve against this catalog. The check runs once at
//! startup so that a typo in a tag fails loudly instead of silently denying
//! (or granting) access.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::permissions::{MODULE_WILDCARD_SUFFIX, WILDCARD};
use crate::roles::SystemRole;

/// Built-in catalog: `(permission, description)` in display order.
pub const BUILTIN_PERMISSIONS: &[(&str, &str)] = &[
    ("dashboard.read", "View dashboard"),
    ("companies.read", "View company information"),
    ("companies.write", "Manage company settings"),
    ("branches.read", "View branches"),
    ("branches.write", "Manage branches"),
    ("products.read", "View products"),
    ("products.write", "Manage products"),
    ("inventory.read", "View inventory"),
    ("inventory.write", "Manage inventory"),
    ("inventory.transfer", "Transfer inventory"),
    ("inventory.adjust", "Adjust inventory"),
    ("sales.read", "View sales data"),
    ("sales.write", "Create and manage sales"),
    ("pos.access", "Access POS system"),
    ("orders.read", "View orders"),
    ("orders.write", "Manage orders"),
    ("quotes.read", "View quotes"),
    ("quotes.write", "Manage quotes"),
    ("invoices.read", "View invoices"),
    ("invoices.write", "Manage invoices"),
    ("purchases.read", "View purchases"),
    ("purchases.write", "Manage purchases"),
    ("suppliers.read", "View suppliers"),
    ("suppliers.write", "Manage suppliers"),
    ("finance.read", "View financial data"),
    ("finance.write", "Manage financial data"),
    ("accounting.read", "View accounting data"),
    ("accounting.write", "Manage accounting"),
    ("hr.read", "View HR data"),
    ("hr.write", "Manage HR"),
    ("payroll.read", "View payroll"),
    ("payroll.write", "Manage payroll"),
    ("crm.read", "View CRM data"),
    ("crm.write", "Manage CRM"),
    ("customers.read", "View customers"),
    ("customers.write", "Manage customers"),
    ("projects.read", "View projects"),
    ("projects.write", "Manage projects"),
    ("tasks.read", "View tasks"),
    ("tasks.write", "Manage tasks"),
    ("users.read", "View users"),
    ("users.write", "Manage users"),
    ("roles.read", "View roles"),
    ("roles.write", "Manage roles"),
    ("settings.read", "View settings"),
    ("settings.write", "Manage settings"),
    ("integrations.read", "View integrations"),
    ("integrations.write", "Manage integrations"),
    ("automation.read", "View automation"),
    ("automation.write", "Manage automation"),
    ("reports.read", "View reports"),
    ("reports.write", "Generate reports"),
    ("audit.read", "View audit logs"),
];

/// A permission reference that did not resolve against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogViolation {
    /// Where the reference came from (e.g. `"role:auditor"`, `"menu:Payroll"`).
    pub source: String,
    pub permission: String,
}

impl fmt::Display for CatalogViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} references '{}'", self.source, self.permission)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown permission '{0}'")]
    Unknown(String),

    #[error("{} permission reference(s) not in catalog: {}", .0.len(), join(.0))]
    Inconsistent(Vec<CatalogViolation>),
}

fn join(violations: &[CatalogViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read-only view over a permission catalog.
#[derive(Debug, Clone, Copy)]
pub struct PermissionCatalog {
    entries: &'static [(&'static str, &'static str)],
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PermissionCatalog {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub const fn builtin() -> Self {
        Self::new(BUILTIN_PERMISSIONS)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.entries.iter().any(|(name, _)| *name == permission)
    }

    pub fn describe(&self, permission: &str) -> Option<&'static str> {
        if permission == WILDCARD {
            return Some("All permissions");
        }
        self.entries
            .iter()
            .find(|(name, _)| *name == permission)
            .map(|(_, description)| *description)
    }

    /// Distinct module names, in catalog order.
    pub fn modules(&self) -> Vec<&'static str> {
        let mut modules: Vec<&'static str> = Vec::new();
        for (name, _) in self.entries {
            if let Some((module, _)) = name.split_once('.') {
                if !modules.contains(&module) {
                    modules.push(module);
                }
            }
        }
        modules
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.entries
            .iter()
            .any(|(name, _)| name.split_once('.').is_some_and(|(m, _)| m == module))
    }

    /// Validate a single grant or requirement.
    ///
    /// Accepts `"*"`, `"<module>.*"` for a known module, and exact entries.
    pub fn validate(&self, permission: &str) -> Result<(), CatalogError> {
        if permission == WILDCARD || self.contains(permission) {
            return Ok(());
        }
        match permission.strip_suffix(MODULE_WILDCARD_SUFFIX) {
            Some(module) if self.has_module(module) => Ok(()),
            _ => Err(CatalogError::Unknown(permission.to_string())),
        }
    }

    /// Validate a batch of `(source, permission)` references, reporting every
    /// violation rather than the first.
    pub fn check_references<'a, I>(&self, references: I) -> Result<(), CatalogError>
    where
        I: IntoIterator<Item = (String, &'a str)>,
    {
        let violations: Vec<CatalogViolation> = references
            .into_iter()
            .filter(|(_, permission)| self.validate(permission).is_err())
            .map(|(source, permission)| CatalogViolation {
                source,
                permission: permission.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Inconsistent(violations))
        }
    }

    /// Check the built-in role table against this catalog.
    pub fn check_system_roles(&self) -> Result<(), CatalogError> {
        self.check_references(SystemRole::ALL.iter().flat_map(|role| {
            role.permissions()
                .iter()
                .map(move |p| (format!("role:{}", role.as_str()), *p))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_well_formed() {
        let catalog = PermissionCatalog::builtin();
        for name in catalog.iter() {
            let (module, action) = name.split_once('.').expect("module.action");
            assert!(!module.is_empty() && !action.is_empty(), "{name}");
            assert!(!action.contains('.'), "{name}");
        }
        let mut names: Vec<_> = catalog.iter().collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len(), "duplicate catalog entries");
    }

    #[test]
    fn built_in_roles_are_subsets_of_catalog() {
        PermissionCatalog::builtin().check_system_roles().unwrap();
    }

    #[test]
    fn validate_accepts_known_module_wildcard_only() {
        let catalog = PermissionCatalog::builtin();
        assert!(catalog.validate("*").is_ok());
        assert!(catalog.validate("sales.*").is_ok());
        assert!(catalog.validate("inventory.adjust").is_ok());
        assert_eq!(
            catalog.validate("warehouse.*"),
            Err(CatalogError::Unknown("warehouse.*".to_string()))
        );
        assert!(catalog.validate("orders.wrte").is_err());
    }

    #[test]
    fn check_references_reports_every_violation() {
        let catalog = PermissionCatalog::builtin();
        let refs = vec![
            ("menu:Orders".to_string(), "orders.read"),
            ("menu:Payroll".to_string(), "payrol.read"),
            ("route:/crm".to_string(), "crm.view"),
        ];
        let Err(CatalogError::Inconsistent(violations)) = catalog.check_references(refs) else {
            panic!("expected inconsistency");
        };
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].source, "menu:Payroll");
        assert_eq!(violations[1].permission, "crm.view");
    }

    #[test]
    fn modules_are_distinct_and_ordered() {
        let modules = PermissionCatalog::builtin().modules();
        assert_eq!(modules.first(), Some(&"dashboard"));
        assert_eq!(modules.last(), Some(&"audit"));
        assert_eq!(modules.iter().filter(|m| **m == "inventory").count(), 1);
    }

    #[test]
    fn describe_covers_wildcard() {
        let catalog = PermissionCatalog::builtin();
        assert_eq!(catalog.describe("pos.access"), Some("Access POS system"));
        assert_eq!(catalog.describe("*"), Some("All permissions"));
        assert_eq!(catalog.describe("nope.read"), None);
    }
}
