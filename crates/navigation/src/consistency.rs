use branchdesk_auth::{CatalogError, PermissionCatalog, SystemRole};

use crate::actions::QuickAction;
use crate::menu::MenuItem;
use crate::routes::ROUTES;

/// Verify that every permission referenced by the role table, the given menu,
/// the route table and the quick actions exists in `catalog`.
///
/// Intended to run once at startup; all violations are collected.
pub fn check_catalog_consistency(
    catalog: &PermissionCatalog,
    menu: &[MenuItem],
) -> Result<(), CatalogError> {
    let roles = SystemRole::ALL.iter().flat_map(|role| {
        role.permissions()
            .iter()
            .map(move |p| (format!("role:{role}"), *p))
    });

    let menu_refs = menu.iter().flat_map(MenuItem::walk).filter_map(|item| {
        let permission = item.permission.as_ref()?;
        Some((format!("menu:{}", item.label), permission.as_str()))
    });

    let route_refs = ROUTES
        .iter()
        .filter_map(|route| Some((format!("route:{}", route.path), route.permission?)));

    let action_refs = QuickAction::ALL
        .iter()
        .map(|quick| (format!("action:{}", quick.label()), quick.permission()));

    let result = catalog.check_references(roles.chain(menu_refs).chain(route_refs).chain(action_refs));
    if let Err(CatalogError::Inconsistent(violations)) = &result {
        for violation in violations {
            tracing::error!(source = %violation.source, permission = %violation.permission, "unknown permission reference");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Icon;
    use crate::sidebar::default_navigation;

    #[test]
    fn shipped_navigation_is_consistent() {
        check_catalog_consistency(&PermissionCatalog::builtin(), &default_navigation()).unwrap();
    }

    #[test]
    fn typo_in_menu_tag_is_reported_with_source() {
        let mut menu = default_navigation();
        menu.push(MenuItem::link("Payroll Runs", "/hr/payroll/runs", Icon::Banknote).requires("payrol.read"));

        let Err(CatalogError::Inconsistent(violations)) =
            check_catalog_consistency(&PermissionCatalog::builtin(), &menu)
        else {
            panic!("expected inconsistency");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].source, "menu:Payroll Runs");
        assert_eq!(violations[0].permission, "payrol.read");
    }

    #[test]
    fn nested_entries_are_checked() {
        let menu = vec![MenuItem::group(
            "Ops",
            Icon::Settings,
            vec![MenuItem::link("Fleet", "/fleet", Icon::Truck).requires("fleet.read")],
        )];
        let err = check_catalog_consistency(&PermissionCatalog::builtin(), &menu).unwrap_err();
        assert!(err.to_string().contains("menu:Fleet references 'fleet.read'"));
    }

    #[test]
    fn empty_catalog_rejects_everything_tagged() {
        const EMPTY: &[(&str, &str)] = &[];
        let err = check_catalog_consistency(&PermissionCatalog::new(EMPTY), &[]).unwrap_err();
        let CatalogError::Inconsistent(violations) = err else {
            panic!("expected inconsistency");
        };
        assert!(violations.iter().any(|v| v.source.starts_with("route:")));
        assert!(violations.iter().any(|v| v.source.starts_with("action:")));
        // admin's "*" is always valid
        assert!(!violations.iter().any(|v| v.source == "role:admin"));
    }
}
