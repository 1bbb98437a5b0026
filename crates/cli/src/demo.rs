//! Scripted walk through a session against the in-memory service.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use branchdesk_auth::SessionScope;
use branchdesk_commerce::{
    Cart, CartTotals, Money, PaymentMethod, PosProduct, Rate, StockLevel, StockSummary, order_number, sku,
};
use branchdesk_core::{BranchId, ProductId};
use branchdesk_navigation::{ActionEffect, QuickAction, UiAction};
use branchdesk_session::{
    Application, Branch, InMemoryAuthBackend, NewBranch, NewCompany, SignUpOutcome, SignUpRequest,
};

use crate::commands::render_menu;

const DEMO_PASSWORD: &str = "Demo#Passw0rd";

#[derive(Serialize)]
struct Report {
    email: String,
    role: String,
    menu: Vec<String>,
    quick_actions: Vec<&'static str>,
    order_number: String,
    sale: CartTotals,
    stock: StockSummary,
    scope_after_switch: SessionScope,
    scope_after_sign_out: SessionScope,
}

fn sign_up_request(email: &str) -> SignUpRequest {
    SignUpRequest {
        email: email.to_string(),
        password: DEMO_PASSWORD.to_string(),
        full_name: "Demo Owner".to_string(),
        company: NewCompany {
            name: "Demo Trading".to_string(),
            industry: "retail".to_string(),
        },
        branch: NewBranch {
            name: "Main Branch".to_string(),
            address: "1 Market Street".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            postal_code: "73301".to_string(),
            phone: "5125550100".to_string(),
        },
    }
}

fn ring_up_sale() -> Result<(String, CartTotals)> {
    let products = [
        PosProduct {
            id: ProductId::new(),
            sku: sku("electronics", 1)?,
            name: "USB-C Cable".to_string(),
            price: Money::from_cents(1299),
        },
        PosProduct {
            id: ProductId::new(),
            sku: sku("accessories", 7)?,
            name: "Phone Case".to_string(),
            price: Money::from_cents(2450),
        },
    ];

    let mut cart = Cart::new();
    cart.add(&products[0])?;
    cart.add(&products[0])?;
    cart.add(&products[1])?;
    cart.set_discount(Rate::from_bps(500)?);
    cart.set_payment_method(PaymentMethod::Card);

    let totals = cart.totals()?;
    tracing::info!(
        items = cart.item_count(),
        total = %totals.total,
        "sale rung up"
    );
    Ok((order_number(1), totals))
}

fn stock_snapshot() -> Result<StockSummary> {
    let levels = [
        StockLevel::new("ELE-0001", "USB-C Cable", "Main", 120, 10, 40)?.with_bin("A-01"),
        StockLevel::new("ACC-0007", "Phone Case", "Main", 30, 0, 50)?,
        StockLevel::new("ACC-0009", "Screen Guard", "Main", 8, 0, 50)?,
        StockLevel::new("ELE-0004", "Charger", "Main", 0, 0, 20)?,
    ];
    Ok(StockSummary::from_levels(&levels))
}

pub async fn run(email: &str, json: bool) -> Result<()> {
    let backend = Arc::new(InMemoryAuthBackend::new());
    let mut app = Application::bootstrap(backend.clone())
        .await
        .context("application failed to start")?;

    let outcome = app
        .session_mut()
        .sign_up(&sign_up_request(email))
        .await
        .context("sign-up failed")?;
    if outcome == SignUpOutcome::ConfirmationRequired {
        bail!("sign-up is awaiting email confirmation");
    }

    let principal = app
        .session()
        .principal()
        .cloned()
        .context("signed up without a profile")?;

    // a second branch to switch into
    let warehouse = BranchId::new();
    backend.add_branch(Branch {
        id: warehouse,
        company_id: principal.company_id,
        name: "Warehouse".to_string(),
        city: "Round Rock".to_string(),
        active: true,
    });
    // rehydrate so the new branch is among the loaded ones
    app.session_mut()
        .init()
        .await
        .context("reloading the session failed")?;

    let menu = app.visible_menu();
    let quick_actions = app.session().quick_actions();

    match app
        .session_mut()
        .apply_action(UiAction::Quick(QuickAction::PosSale))
        .await?
    {
        ActionEffect::Navigate(path) => tracing::info!(path, "opened point of sale"),
        other => bail!("unexpected effect {other:?}"),
    }
    let (number, sale) = ring_up_sale()?;
    let stock = stock_snapshot()?;

    app.session_mut()
        .apply_action(UiAction::SwitchBranch(warehouse))
        .await?;
    let scope_after_switch = app.session().scope();

    app.session_mut().apply_action(UiAction::SignOut).await?;
    let scope_after_sign_out = app.session().scope();

    let report = Report {
        email: principal.email.clone(),
        role: principal.role.to_string(),
        menu: menu.iter().map(|item| item.label.to_string()).collect(),
        quick_actions: quick_actions.iter().map(QuickAction::label).collect(),
        order_number: number,
        sale,
        stock,
        scope_after_switch,
        scope_after_sign_out,
    };
    app.shutdown();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("signed up {} as {}", report.email, report.role);
    println!("\nmenu:");
    print!("{}", render_menu(&menu));
    println!("\nquick actions: {}", report.quick_actions.join(", "));
    println!(
        "\n{}: subtotal {}  discount -{}  tax {}  total {}",
        report.order_number, sale.subtotal, sale.discount, sale.tax, sale.total
    );
    println!(
        "stock: {} good, {} low, {} critical, {} out",
        stock.good, stock.low, stock.critical, stock.out
    );
    println!(
        "\nswitched to branch {}",
        scope_after_switch
            .branch_id
            .map(|id| id.to_string())
            .unwrap_or_default()
    );
    println!(
        "signed out; scope empty: {}",
        report.scope_after_sign_out.is_empty()
    );
    Ok(())
}
