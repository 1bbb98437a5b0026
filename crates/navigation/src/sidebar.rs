//! Default sidebar navigation.

use crate::menu::{Icon, MenuItem};

/// The application's sidebar tree, tagged with the permission each entry
/// requires. Groups carry no tag of their own; their visibility follows from
/// their children under [`crate::filter_menu_tree`].
pub fn default_navigation() -> Vec<MenuItem> {
    vec![
        MenuItem::link("Dashboard", "/dashboard", Icon::Home).requires("dashboard.read"),
        MenuItem::link("Branches", "/branches", Icon::Building).requires("branches.read"),
        MenuItem::group(
            "Sales",
            Icon::ShoppingCart,
            vec![
                MenuItem::link("POS", "/pos", Icon::CreditCard).requires("pos.access"),
                MenuItem::link("Orders", "/orders", Icon::ShoppingBag).requires("orders.read"),
                MenuItem::link("Quotes", "/quotes", Icon::FileText).requires("quotes.read"),
                MenuItem::link("Invoices", "/invoices", Icon::Receipt).requires("invoices.read"),
                MenuItem::link("Returns", "/returns", Icon::RotateCcw).requires("sales.read"),
            ],
        ),
        MenuItem::group(
            "Products & Inventory",
            Icon::Package,
            vec![
                MenuItem::link("Products", "/products", Icon::Boxes).requires("products.read"),
                MenuItem::link("Stock Levels", "/inventory/levels", Icon::TrendingUp)
                    .requires("inventory.read"),
                MenuItem::link("Transfers", "/inventory/transfers", Icon::Truck)
                    .requires("inventory.transfer"),
                MenuItem::link("Cycle Counts", "/inventory/counts", Icon::RefreshCw)
                    .requires("inventory.adjust"),
            ],
        ),
        MenuItem::group(
            "Purchases",
            Icon::Truck,
            vec![
                MenuItem::link("Suppliers", "/suppliers", Icon::UserCheck).requires("suppliers.read"),
                MenuItem::link("Purchase Orders", "/purchase-orders", Icon::FileSpreadsheet)
                    .requires("purchases.read"),
                MenuItem::link("Goods Receipt", "/grn", Icon::Warehouse).requires("purchases.write"),
                MenuItem::link("Bills", "/bills", Icon::Banknote).requires("purchases.read"),
            ],
        ),
        MenuItem::group(
            "Finance",
            Icon::DollarSign,
            vec![
                MenuItem::link("Chart of Accounts", "/finance/coa", Icon::PieChart)
                    .requires("accounting.read"),
                MenuItem::link("Journal Entries", "/finance/journals", Icon::FileText)
                    .requires("accounting.read"),
                MenuItem::link("Bank Reconciliation", "/finance/reconciliation", Icon::RefreshCw)
                    .requires("finance.write"),
                MenuItem::link("Reports", "/finance/reports", Icon::BarChart).requires("reports.read"),
            ],
        ),
        MenuItem::link("CRM", "/crm", Icon::Users).requires("crm.read"),
        MenuItem::group(
            "HR",
            Icon::UserPlus,
            vec![
                MenuItem::link("Employees", "/hr/employees", Icon::Users).requires("hr.read"),
                MenuItem::link("Attendance", "/hr/attendance", Icon::Clock).requires("hr.read"),
                MenuItem::link("Payroll", "/hr/payroll", Icon::Banknote).requires("payroll.read"),
            ],
        ),
        MenuItem::group(
            "Projects",
            Icon::FolderKanban,
            vec![
                MenuItem::link("Projects", "/projects", Icon::Briefcase).requires("projects.read"),
                MenuItem::link("Tasks", "/tasks", Icon::CheckSquare).requires("tasks.read"),
            ],
        ),
        MenuItem::link("Automation", "/automation", Icon::Zap).requires("automation.read"),
        MenuItem::link("Integrations", "/integrations", Icon::Plug).requires("integrations.read"),
        MenuItem::link("Settings", "/settings", Icon::Settings).requires("settings.read"),
        MenuItem::link("Help", "/help", Icon::HelpCircle),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::filter_menu_tree;
    use branchdesk_auth::SystemRole;

    fn top_labels(role: SystemRole) -> Vec<String> {
        filter_menu_tree(&role, &default_navigation())
            .into_iter()
            .map(|item| item.label.into_owned())
            .collect()
    }

    #[test]
    fn admin_sees_everything() {
        let full = default_navigation();
        assert_eq!(filter_menu_tree(&SystemRole::Admin, &full), full);
    }

    #[test]
    fn employee_sees_front_line_entries() {
        assert_eq!(
            top_labels(SystemRole::Employee),
            vec!["Dashboard", "Sales", "Products & Inventory", "Help"]
        );

        let visible = filter_menu_tree(&SystemRole::Employee, &default_navigation());
        let sales = visible.iter().find(|i| i.label == "Sales").unwrap();
        let children: Vec<_> = sales.children.iter().map(|c| c.label.as_ref()).collect();
        assert_eq!(children, vec!["POS", "Orders"]);
    }

    #[test]
    fn auditor_sees_finance_but_not_pos() {
        let labels = top_labels(SystemRole::Auditor);
        assert!(labels.contains(&"Finance".to_string()));
        assert!(labels.contains(&"Sales".to_string()));

        let visible = filter_menu_tree(&SystemRole::Auditor, &default_navigation());
        let all: Vec<_> = visible
            .iter()
            .flat_map(|item| item.walk())
            .map(|item| item.label.as_ref())
            .collect();
        assert!(!all.contains(&"POS"));
        assert!(!all.contains(&"Bank Reconciliation"));
    }

    #[test]
    fn every_link_has_a_path_and_groups_have_children() {
        for item in default_navigation().iter().flat_map(|i| i.walk()) {
            assert!(item.path.is_some() || item.has_children(), "{}", item.label);
        }
    }
}
