//! `branchdesk-navigation` — permission-gated navigation surface.
//!
//! Menu entries, routes and UI actions each carry an optional permission tag;
//! everything here filters or resolves them through
//! [`branchdesk_auth::PermissionCheck`].

pub mod actions;
pub mod consistency;
pub mod menu;
pub mod routes;
pub mod sidebar;

pub use actions::{ActionEffect, QuickAction, UiAction, available_quick_actions, resolve_action};
pub use consistency::check_catalog_consistency;
pub use menu::{Icon, MenuItem, filter_menu, filter_menu_tree, is_path_active};
pub use routes::{PUBLIC_ROUTES, ROUTES, RouteDecision, RouteDef, resolve_route};
pub use sidebar::default_navigation;
