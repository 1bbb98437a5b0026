//! Header and dashboard actions.

use serde::Serialize;

use branchdesk_auth::{AuthzError, PermissionCheck};
use branchdesk_core::BranchId;

/// Dashboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    CreateInvoice,
    PosSale,
    AddProduct,
    NewOrder,
}

impl QuickAction {
    pub const ALL: [QuickAction; 4] = [
        QuickAction::CreateInvoice,
        QuickAction::PosSale,
        QuickAction::AddProduct,
        QuickAction::NewOrder,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::CreateInvoice => "Create Invoice",
            QuickAction::PosSale => "POS Sale",
            QuickAction::AddProduct => "Add Product",
            QuickAction::NewOrder => "New Order",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QuickAction::CreateInvoice => "Generate a new invoice",
            QuickAction::PosSale => "Start a new sale",
            QuickAction::AddProduct => "Add to inventory",
            QuickAction::NewOrder => "Create sales order",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            QuickAction::CreateInvoice => "/invoices/new",
            QuickAction::PosSale => "/pos",
            QuickAction::AddProduct => "/products/new",
            QuickAction::NewOrder => "/orders/new",
        }
    }

    pub fn permission(&self) -> &'static str {
        match self {
            QuickAction::CreateInvoice => "invoices.write",
            QuickAction::PosSale => "pos.access",
            QuickAction::AddProduct => "products.write",
            QuickAction::NewOrder => "orders.write",
        }
    }
}

/// A user-triggered action from the header or dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "target")]
pub enum UiAction {
    Quick(QuickAction),
    SwitchBranch(BranchId),
    SignOut,
    ToggleSidebar,
}

impl UiAction {
    /// Permission required to trigger the action, if any.
    pub fn permission(&self) -> Option<&'static str> {
        match self {
            UiAction::Quick(quick) => Some(quick.permission()),
            UiAction::SwitchBranch(_) | UiAction::SignOut | UiAction::ToggleSidebar => None,
        }
    }
}

/// What the shell should do in response to an accepted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "effect", content = "target")]
pub enum ActionEffect {
    Navigate(&'static str),
    SwitchBranch(BranchId),
    SignOut,
    ToggleSidebar,
}

/// Check an action against the viewer's permissions and map it to an effect.
pub fn resolve_action<A: PermissionCheck + ?Sized>(
    access: &A,
    action: UiAction,
) -> Result<ActionEffect, AuthzError> {
    if let Some(permission) = action.permission() {
        if !access.allows(permission) {
            tracing::debug!(?action, permission, "action forbidden");
            return Err(AuthzError::Forbidden(permission.to_string()));
        }
    }

    Ok(match action {
        UiAction::Quick(quick) => ActionEffect::Navigate(quick.path()),
        UiAction::SwitchBranch(branch_id) => ActionEffect::SwitchBranch(branch_id),
        UiAction::SignOut => ActionEffect::SignOut,
        UiAction::ToggleSidebar => ActionEffect::ToggleSidebar,
    })
}

/// Quick actions the viewer may trigger, in display order.
pub fn available_quick_actions<A: PermissionCheck + ?Sized>(access: &A) -> Vec<QuickAction> {
    QuickAction::ALL
        .into_iter()
        .filter(|quick| access.allows(quick.permission()))
        .collect()
}
