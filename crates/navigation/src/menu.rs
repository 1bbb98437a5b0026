//! Menu model and permission filters.

use std::borrow::Cow;

use serde::Serialize;

use branchdesk_auth::{Permission, PermissionCheck};

/// Icon shown next to a menu entry.
///
/// A closed set of variants; renderers map each to their own asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Home,
    Building,
    ShoppingCart,
    CreditCard,
    ShoppingBag,
    FileText,
    Receipt,
    RotateCcw,
    Package,
    Boxes,
    TrendingUp,
    Truck,
    RefreshCw,
    UserCheck,
    FileSpreadsheet,
    Warehouse,
    Banknote,
    DollarSign,
    PieChart,
    BarChart,
    Users,
    UserPlus,
    Clock,
    FolderKanban,
    Briefcase,
    CheckSquare,
    Zap,
    Plug,
    Settings,
    HelpCircle,
}

/// A navigation entry: a link, a group of entries, or both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Cow<'static, str>>,
    pub icon: Icon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    pub fn link(label: &'static str, path: &'static str, icon: Icon) -> Self {
        Self {
            label: Cow::Borrowed(label),
            path: Some(Cow::Borrowed(path)),
            icon,
            permission: None,
            children: Vec::new(),
        }
    }

    pub fn group(label: &'static str, icon: Icon, children: Vec<MenuItem>) -> Self {
        Self {
            label: Cow::Borrowed(label),
            path: None,
            icon,
            permission: None,
            children,
        }
    }

    /// Tag this entry with a required permission.
    pub fn requires(mut self, permission: &'static str) -> Self {
        self.permission = Some(Permission::from_static(permission));
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Untagged entries are visible to everyone.
    pub fn is_visible_to<A: PermissionCheck + ?Sized>(&self, access: &A) -> bool {
        self.permission
            .as_ref()
            .is_none_or(|permission| access.allows(permission.as_str()))
    }

    /// Active when the current path is this entry's path (or below it), or
    /// when any child is active.
    pub fn is_active(&self, current_path: &str) -> bool {
        self.path
            .as_deref()
            .is_some_and(|path| is_path_active(path, current_path))
            || self.children.iter().any(|child| child.is_active(current_path))
    }

    /// Depth-first walk over this entry and all descendants.
    pub fn walk(&self) -> Box<dyn Iterator<Item = &MenuItem> + '_> {
        Box::new(std::iter::once(self).chain(self.children.iter().flat_map(MenuItem::walk)))
    }
}

/// `path` matches `current` exactly or as a path prefix (`/orders` matches
/// `/orders/42` but not `/orders-archive`).
pub fn is_path_active(path: &str, current: &str) -> bool {
    current == path
        || current
            .strip_prefix(path)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Flat filter: keep top-level entries that are untagged or granted.
///
/// Relative order is preserved. Children are not inspected; see
/// [`filter_menu_tree`] for nested menus.
pub fn filter_menu<A: PermissionCheck + ?Sized>(access: &A, items: &[MenuItem]) -> Vec<MenuItem> {
    items
        .iter()
        .filter(|item| item.is_visible_to(access))
        .cloned()
        .collect()
}

/// Recursive filter.
///
/// Applies the flat rule at every level and drops a group entry once all of
/// its children have been filtered out. Order is preserved at every level.
pub fn filter_menu_tree<A: PermissionCheck + ?Sized>(
    access: &A,
    items: &[MenuItem],
) -> Vec<MenuItem> {
    items.iter().filter_map(|item| prune(access, item)).collect()
}

fn prune<A: PermissionCheck + ?Sized>(access: &A, item: &MenuItem) -> Option<MenuItem> {
    if !item.is_visible_to(access) {
        return None;
    }
    if !item.has_children() {
        return Some(item.clone());
    }

    let children = filter_menu_tree(access, &item.children);
    if children.is_empty() {
        return None;
    }

    Some(MenuItem {
        label: item.label.clone(),
        path: item.path.clone(),
        icon: item.icon,
        permission: item.permission.clone(),
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use branchdesk_auth::SystemRole;

    fn sample() -> Vec<MenuItem> {
        vec![
            MenuItem::link("Dashboard", "/dashboard", Icon::Home).requires("dashboard.read"),
            MenuItem::link("Users", "/users", Icon::Users).requires("users.write"),
            MenuItem::link("Help", "/help", Icon::HelpCircle),
            MenuItem::group(
                "Finance",
                Icon::DollarSign,
                vec![
                    MenuItem::link("Journals", "/finance/journals", Icon::FileText)
                        .requires("accounting.write"),
                ],
            ),
        ]
    }

    fn labels(items: &[MenuItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_ref()).collect()
    }

    #[test]
    fn flat_filter_drops_failing_tags_and_keeps_order() {
        let visible = filter_menu(&SystemRole::Employee, &sample());
        assert_eq!(labels(&visible), vec!["Dashboard", "Help", "Finance"]);
    }

    #[test]
    fn flat_filter_does_not_recurse() {
        let visible = filter_menu(&SystemRole::Employee, &sample());
        let finance = visible.iter().find(|i| i.label == "Finance").unwrap();
        assert_eq!(finance.children.len(), 1);
    }

    #[test]
    fn tree_filter_drops_emptied_groups() {
        let visible = filter_menu_tree(&SystemRole::Employee, &sample());
        assert_eq!(labels(&visible), vec!["Dashboard", "Help"]);

        let accountant = filter_menu_tree(&SystemRole::Accountant, &sample());
        assert_eq!(labels(&accountant), vec!["Dashboard", "Help", "Finance"]);
    }

    #[test]
    fn tree_filter_keeps_childless_untagged_links() {
        let none: Option<SystemRole> = None;
        let visible = filter_menu_tree(&none, &sample());
        assert_eq!(labels(&visible), vec!["Help"]);
    }

    #[test]
    fn tree_filter_drops_subtree_under_failing_parent_tag() {
        let items = vec![
            MenuItem::group(
                "Admin",
                Icon::Settings,
                vec![MenuItem::link("Dashboard", "/dashboard", Icon::Home)],
            )
            .requires("settings.write"),
        ];
        assert!(filter_menu_tree(&SystemRole::Employee, &items).is_empty());
        assert_eq!(filter_menu_tree(&SystemRole::Admin, &items).len(), 1);
    }

    #[test]
    fn path_activity_respects_segment_boundaries() {
        assert!(is_path_active("/orders", "/orders"));
        assert!(is_path_active("/orders", "/orders/42"));
        assert!(!is_path_active("/orders", "/orders-archive"));
        assert!(!is_path_active("/orders/42", "/orders"));
    }

    #[test]
    fn group_is_active_through_child() {
        let items = sample();
        let finance = &items[3];
        assert!(finance.is_active("/finance/journals/7"));
        assert!(!finance.is_active("/dashboard"));
    }

    #[test]
    fn walk_visits_descendants() {
        let items = sample();
        let all: Vec<_> = items.iter().flat_map(MenuItem::walk).map(|i| i.label.as_ref()).collect();
        assert_eq!(all, vec!["Dashboard", "Users", "Help", "Finance", "Journals"]);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        const TAGS: &[&str] = &[
            "dashboard.read",
            "pos.access",
            "users.write",
            "finance.read",
            "orders.write",
            "audit.read",
        ];

        fn item() -> impl Strategy<Value = MenuItem> {
            (0..TAGS.len() + 1).prop_map(|i| {
                let link = MenuItem::link("entry", "/entry", Icon::Home);
                match TAGS.get(i) {
                    Some(tag) => link.requires(tag),
                    None => link,
                }
            })
        }

        fn role() -> impl Strategy<Value = SystemRole> {
            proptest::sample::select(SystemRole::ALL.to_vec())
        }

        proptest! {
            /// Property: flat filter output is an order-preserving subsequence of
            /// its input, and every survivor passes the check.
            #[test]
            fn flat_filter_is_stable_subsequence(
                role in role(),
                items in proptest::collection::vec(item(), 0..16)
            ) {
                let visible = filter_menu(&role, &items);
                let mut cursor = items.iter();
                for kept in &visible {
                    prop_assert!(kept.is_visible_to(&role));
                    prop_assert!(cursor.any(|candidate| candidate == kept));
                }
                let expected = items.iter().filter(|i| i.is_visible_to(&role)).count();
                prop_assert_eq!(visible.len(), expected);
            }
        }
    }
}
