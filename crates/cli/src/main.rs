//! `branchdesk` — inspect the permission model and exercise a session.
//!
//! - `branchdesk roles` - built-in roles and their grants
//! - `branchdesk check <role> <permission>` - explain a permission decision
//! - `branchdesk menu <role>` - sidebar as a role sees it
//! - `branchdesk routes [role]` - route decisions for a role (or signed out)
//! - `branchdesk catalog [--verify]` - permission catalog and consistency check
//! - `branchdesk config` - show the service configuration from the environment
//! - `branchdesk demo` - sign up, sell and sign out against the in-memory service

use anyhow::Result;
use clap::{Parser, Subcommand};

use branchdesk_auth::SystemRole;

mod commands;
mod demo;

/// Branch back-office permission and session tooling
#[derive(Parser)]
#[command(name = "branchdesk")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in roles
    Roles,

    /// Explain whether a role holds a permission
    Check {
        role: SystemRole,
        permission: String,
    },

    /// Show the sidebar visible to a role
    Menu {
        role: SystemRole,

        /// Apply only the top-level filter (groups are not pruned)
        #[arg(long)]
        flat: bool,
    },

    /// Resolve every known route for a role; omit the role for a signed-out visitor
    Routes { role: Option<SystemRole> },

    /// List the permission catalog
    Catalog {
        /// Check roles, menu, routes and actions against the catalog
        #[arg(long)]
        verify: bool,
    },

    /// Show the service configuration read from the environment
    Config,

    /// Walk through a session against the in-memory service
    Demo {
        /// Email for the demo account
        #[arg(long, default_value = "owner@example.com")]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    branchdesk_observability::init_with(branchdesk_observability::LogFormat::from_env(), "warn");

    match cli.command {
        Commands::Roles => commands::roles(cli.json),
        Commands::Check { role, permission } => commands::check(role, &permission, cli.json),
        Commands::Menu { role, flat } => commands::menu(role, flat, cli.json),
        Commands::Routes { role } => commands::routes(role, cli.json),
        Commands::Catalog { verify } => commands::catalog(verify, cli.json),
        Commands::Config => commands::config(cli.json),
        Commands::Demo { email } => demo::run(&email, cli.json).await,
    }
}
