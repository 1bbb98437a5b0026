use anyhow::{Context, Result};
use serde::Serialize;

use branchdesk_auth::{PermissionCatalog, SystemRole, explain};
use branchdesk_navigation::{
    MenuItem, PUBLIC_ROUTES, ROUTES, RouteDecision, check_catalog_consistency, default_navigation,
    filter_menu, filter_menu_tree, resolve_route,
};
use branchdesk_session::AppConfig;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct RoleSummary {
    role: SystemRole,
    description: &'static str,
    permissions: &'static [&'static str],
}

pub fn roles(json: bool) -> Result<()> {
    let summaries: Vec<RoleSummary> = SystemRole::ALL
        .into_iter()
        .map(|role| RoleSummary {
            role,
            description: role.description(),
            permissions: role.permissions(),
        })
        .collect();

    if json {
        return print_json(&summaries);
    }
    for summary in summaries {
        println!(
            "{:<15} {:>3} grants  {}",
            summary.role.as_str(),
            summary.permissions.len(),
            summary.description
        );
    }
    Ok(())
}

pub fn check(role: SystemRole, permission: &str, json: bool) -> Result<()> {
    let catalog = PermissionCatalog::builtin();
    if !catalog.contains(permission) {
        tracing::warn!(permission, "permission is not in the catalog");
    }

    let decision = explain(role, permission);
    if json {
        return print_json(&decision);
    }
    let verdict = if decision.granted() { "GRANTED" } else { "DENIED" };
    println!("{verdict}: {}", decision.reason());
    Ok(())
}

pub fn menu(role: SystemRole, flat: bool, json: bool) -> Result<()> {
    let navigation = default_navigation();
    let visible = if flat {
        filter_menu(&role, &navigation)
    } else {
        filter_menu_tree(&role, &navigation)
    };

    if json {
        return print_json(&visible);
    }
    print!("{}", render_menu(&visible));
    Ok(())
}

/// Indented outline, two spaces per level.
pub fn render_menu(items: &[MenuItem]) -> String {
    let mut out = String::new();
    render_level(items, 0, &mut out);
    out
}

fn render_level(items: &[MenuItem], depth: usize, out: &mut String) {
    for item in items {
        let indent = "  ".repeat(depth);
        match &item.path {
            Some(path) => out.push_str(&format!("{indent}{} ({path})\n", item.label)),
            None => out.push_str(&format!("{indent}{}\n", item.label)),
        }
        render_level(&item.children, depth + 1, out);
    }
}

#[derive(Serialize)]
struct RouteRow {
    path: &'static str,
    decision: RouteDecision,
}

fn route_rows(role: Option<SystemRole>) -> Vec<RouteRow> {
    PUBLIC_ROUTES
        .iter()
        .chain(ROUTES)
        .map(|route| RouteRow {
            path: route.path,
            decision: match role {
                Some(role) => resolve_route(route.path, Some(&role)),
                None => resolve_route::<SystemRole>(route.path, None),
            },
        })
        .collect()
}

pub fn describe_decision(decision: &RouteDecision) -> String {
    match decision {
        RouteDecision::Render(route) if route.ready => "render".to_string(),
        RouteDecision::Render(_) => "render (coming soon)".to_string(),
        RouteDecision::Redirect(target) => format!("redirect -> {target}"),
        RouteDecision::Forbidden(route) => {
            format!("forbidden (needs {})", route.permission.unwrap_or("-"))
        }
        RouteDecision::NotFound => "not found".to_string(),
    }
}

pub fn routes(role: Option<SystemRole>, json: bool) -> Result<()> {
    let rows = route_rows(role);
    if json {
        return print_json(&rows);
    }
    for row in rows {
        println!("{:<26} {}", row.path, describe_decision(&row.decision));
    }
    Ok(())
}

#[derive(Serialize)]
struct CatalogEntry {
    permission: &'static str,
    description: &'static str,
}

pub fn catalog(verify: bool, json: bool) -> Result<()> {
    let catalog = PermissionCatalog::builtin();

    if verify {
        check_catalog_consistency(&catalog, &default_navigation())
            .context("catalog consistency check failed")?;
        println!("catalog consistent: {} permissions", catalog.len());
        return Ok(());
    }

    let entries: Vec<CatalogEntry> = catalog
        .iter()
        .map(|permission| CatalogEntry {
            permission,
            description: catalog.describe(permission).unwrap_or_default(),
        })
        .collect();

    if json {
        return print_json(&entries);
    }
    for entry in entries {
        println!("{:<22} {}", entry.permission, entry.description);
    }
    Ok(())
}

pub fn config(json: bool) -> Result<()> {
    let config = AppConfig::from_env().context("service configuration is incomplete")?;
    if json {
        return print_json(&serde_json::json!({
            "service_url": config.service_url,
            "anon_key": "<redacted>",
            "request_timeout_secs": config.request_timeout.map(|t| t.as_secs()),
        }));
    }
    println!("{config:#?}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_outline_indents_children() {
        let visible = filter_menu_tree(&SystemRole::Employee, &default_navigation());
        let outline = render_menu(&visible);
        assert!(outline.starts_with("Dashboard (/dashboard)\nSales\n  POS (/pos)\n"));
        assert!(!outline.contains("Settings"));
    }

    #[test]
    fn signed_out_rows_redirect_everything_but_entry_points() {
        let rows = route_rows(None);
        for row in &rows {
            let public = row.path == "/signin" || row.path == "/signup";
            assert_eq!(matches!(row.decision, RouteDecision::Render(_)), public, "{}", row.path);
        }
    }

    #[test]
    fn decision_descriptions() {
        let rows = route_rows(Some(SystemRole::Employee));
        let settings = rows.iter().find(|r| r.path == "/settings").unwrap();
        assert_eq!(describe_decision(&settings.decision), "forbidden (needs settings.read)");
        let signin = rows.iter().find(|r| r.path == "/signin").unwrap();
        assert_eq!(describe_decision(&signin.decision), "redirect -> /dashboard");
        let pos = rows.iter().find(|r| r.path == "/pos").unwrap();
        assert_eq!(describe_decision(&pos.decision), "render");
    }
}
