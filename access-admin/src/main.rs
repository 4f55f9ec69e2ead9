/*!
 * Access-control administrative CLI
 *
 * Command-line management of the roles, admin records and role assignments
 * kept by access-core. Every change goes through the access-core stores, so
 * the same validation, uniqueness and referential-integrity rules apply here
 * as in any other caller.
 *
 * Key Features:
 * - Role management (list, add, edit, activate, deactivate, remove)
 * - Admin management (list, grant, revoke, change code)
 * - User management (list, add, remove with cascades, renumber, role assignment)
 * - Search with regex and fixed-string support
 * - Confirmation prompts for destructive operations
 *
 * The database is configured through DATABASE_URL (a .env file is honoured).
 * Set RUST_LOG to see what the stores are doing.
 */

mod admin_cli;

use access_core::{Store, StoreConfig};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use admin_cli::admin_commands::{AdminAction, handle_admin_command_with_store};
use admin_cli::role_commands::{RoleAction, handle_role_command_with_store};
use admin_cli::user_commands::{UserAction, handle_user_command_with_store};

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[command(name = "access-admin")]
#[command(about = "Administrative CLI for role and admin management")]
#[command(version)]
struct Cli {
    /// Show extended version information
    #[arg(long, action = clap::ArgAction::SetTrue)]
    version_info: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage roles")]
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
    #[command(about = "Manage admin records")]
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    #[command(about = "Manage users and their role assignments")]
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "access_core=warn,access_admin=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.version_info {
        println!("access-admin {}", built_info::PKG_VERSION);
        println!("Built: {}", built_info::BUILT_TIME_UTC);
        if let Some(commit) = built_info::GIT_COMMIT_HASH {
            println!("Git commit: {}", commit);
        }
        return Ok(());
    }

    let Some(command) = cli.command else {
        return Err("No command given. Run with --help for usage.".into());
    };

    init_tracing();

    let config = StoreConfig::from_env()?;
    let store = Store::open(&config)?;
    debug!("Opened database {}", config.database_url);

    match command {
        Commands::Role { action } => handle_role_command_with_store(&store, action)?,
        Commands::Admin { action } => handle_admin_command_with_store(&store, action)?,
        Commands::User { action } => handle_user_command_with_store(&store, action)?,
    }

    Ok(())
}
