//! Route surface and access resolution.

use serde::Serialize;

use branchdesk_auth::PermissionCheck;

/// A named application path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteDef {
    pub path: &'static str,
    pub title: &'static str,
    /// Permission required to render the route, if any.
    pub permission: Option<&'static str>,
    /// `false` for modules that only render a placeholder page.
    pub ready: bool,
}

const fn route(path: &'static str, title: &'static str, permission: &'static str) -> RouteDef {
    RouteDef {
        path,
        title,
        permission: Some(permission),
        ready: true,
    }
}

const fn placeholder(path: &'static str, title: &'static str, permission: &'static str) -> RouteDef {
    RouteDef {
        path,
        title,
        permission: Some(permission),
        ready: false,
    }
}

pub const SIGN_IN: &str = "/signin";
pub const SIGN_UP: &str = "/signup";
pub const HOME: &str = "/dashboard";

/// Paths reachable without a session.
pub const PUBLIC_ROUTES: &[RouteDef] = &[
    RouteDef {
        path: SIGN_IN,
        title: "Sign in",
        permission: None,
        ready: true,
    },
    RouteDef {
        path: SIGN_UP,
        title: "Sign up",
        permission: None,
        ready: true,
    },
];

/// Paths reachable with a session.
pub const ROUTES: &[RouteDef] = &[
    route("/dashboard", "Dashboard", "dashboard.read"),
    route("/branches", "Branches", "branches.read"),
    route("/products", "Products", "products.read"),
    route("/pos", "Point of Sale", "pos.access"),
    route("/orders", "Orders", "orders.read"),
    route("/inventory/levels", "Stock Levels", "inventory.read"),
    route("/finance/coa", "Chart of Accounts", "accounting.read"),
    placeholder("/orders/new", "New Order", "orders.write"),
    placeholder("/products/new", "Add Product", "products.write"),
    placeholder("/invoices/new", "Create Invoice", "invoices.write"),
    placeholder("/quotes", "Quotes", "quotes.read"),
    placeholder("/invoices", "Invoices", "invoices.read"),
    placeholder("/returns", "Returns", "sales.read"),
    placeholder("/inventory/transfers", "Inventory Transfers", "inventory.transfer"),
    placeholder("/inventory/counts", "Cycle Counts", "inventory.adjust"),
    placeholder("/suppliers", "Suppliers", "suppliers.read"),
    placeholder("/purchase-orders", "Purchase Orders", "purchases.read"),
    placeholder("/grn", "Goods Receipt", "purchases.write"),
    placeholder("/bills", "Bills", "purchases.read"),
    placeholder("/finance/journals", "Journal Entries", "accounting.read"),
    placeholder("/finance/reconciliation", "Bank Reconciliation", "finance.write"),
    placeholder("/finance/reports", "Financial Reports", "reports.read"),
    placeholder("/crm", "CRM", "crm.read"),
    placeholder("/hr/employees", "Employees", "hr.read"),
    placeholder("/hr/attendance", "Attendance", "hr.read"),
    placeholder("/hr/payroll", "Payroll", "payroll.read"),
    placeholder("/projects", "Projects", "projects.read"),
    placeholder("/tasks", "Tasks", "tasks.read"),
    placeholder("/automation", "Automation", "automation.read"),
    placeholder("/integrations", "Integrations", "integrations.read"),
    placeholder("/settings", "Settings", "settings.read"),
    RouteDef {
        path: "/help",
        title: "Help & Documentation",
        permission: None,
        ready: false,
    },
];

/// Outcome of resolving a requested path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "target")]
pub enum RouteDecision {
    Render(&'static RouteDef),
    Redirect(&'static str),
    Forbidden(&'static RouteDef),
    NotFound,
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

fn find(routes: &'static [RouteDef], path: &str) -> Option<&'static RouteDef> {
    routes.iter().find(|route| route.path == path)
}

/// Resolve `path` for a viewer.
///
/// `viewer` is `None` when there is no session: only the public routes
/// render and everything else redirects to sign-in. With a session, the
/// root and the public routes redirect home, and tagged routes require the
/// viewer to hold the tag.
pub fn resolve_route<A: PermissionCheck + ?Sized>(path: &str, viewer: Option<&A>) -> RouteDecision {
    let path = normalize(path);

    let Some(viewer) = viewer else {
        return match find(PUBLIC_ROUTES, path) {
            Some(route) => RouteDecision::Render(route),
            None => RouteDecision::Redirect(SIGN_IN),
        };
    };

    if path == "/" || find(PUBLIC_ROUTES, path).is_some() {
        return RouteDecision::Redirect(HOME);
    }

    match find(ROUTES, path) {
        Some(route) if route.permission.is_none_or(|p| viewer.allows(p)) => {
            RouteDecision::Render(route)
        }
        Some(route) => {
            tracing::debug!(path = route.path, permission = ?route.permission, "route forbidden");
            RouteDecision::Forbidden(route)
        }
        None => RouteDecision::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchdesk_auth::SystemRole;

    fn anonymous(path: &str) -> RouteDecision {
        resolve_route::<SystemRole>(path, None)
    }

    #[test]
    fn anonymous_only_reaches_public_routes() {
        assert!(matches!(anonymous("/signin"), RouteDecision::Render(r) if r.path == SIGN_IN));
        assert!(matches!(anonymous("/signup/"), RouteDecision::Render(r) if r.path == SIGN_UP));
        assert_eq!(anonymous("/dashboard"), RouteDecision::Redirect(SIGN_IN));
        assert_eq!(anonymous("/no-such-page"), RouteDecision::Redirect(SIGN_IN));
        assert_eq!(anonymous("/"), RouteDecision::Redirect(SIGN_IN));
    }

    #[test]
    fn signed_in_users_are_sent_home_from_entry_points() {
        let role = SystemRole::Employee;
        assert_eq!(resolve_route("/", Some(&role)), RouteDecision::Redirect(HOME));
        assert_eq!(resolve_route("/signin", Some(&role)), RouteDecision::Redirect(HOME));
        assert_eq!(resolve_route("/signup", Some(&role)), RouteDecision::Redirect(HOME));
    }

    #[test]
    fn permission_gates_routes() {
        let role = SystemRole::Employee;
        assert!(matches!(resolve_route("/pos", Some(&role)), RouteDecision::Render(_)));
        assert!(matches!(
            resolve_route("/finance/coa", Some(&role)),
            RouteDecision::Forbidden(r) if r.permission == Some("accounting.read")
        ));
        assert!(matches!(resolve_route("/help", Some(&role)), RouteDecision::Render(_)));
    }

    #[test]
    fn query_and_trailing_slash_are_ignored() {
        let role = SystemRole::Admin;
        assert!(matches!(
            resolve_route("/orders/?status=draft", Some(&role)),
            RouteDecision::Render(r) if r.path == "/orders"
        ));
    }

    #[test]
    fn unknown_paths_are_not_found_for_signed_in_users() {
        let role = SystemRole::Admin;
        assert_eq!(resolve_route("/orders/42/edit", Some(&role)), RouteDecision::NotFound);
    }

    #[test]
    fn no_profile_means_no_tagged_routes() {
        let none: Option<SystemRole> = None;
        assert!(matches!(resolve_route("/dashboard", Some(&none)), RouteDecision::Forbidden(_)));
        assert!(matches!(resolve_route("/help", Some(&none)), RouteDecision::Render(_)));
    }

    #[test]
    fn paths_are_unique() {
        let mut paths: Vec<_> = ROUTES.iter().chain(PUBLIC_ROUTES).map(|r| r.path).collect();
        paths.sort_unstable();
        let before = paths.len();
        paths.dedup();
        assert_eq!(before, paths.len());
    }
}
