//! Sage Bistro CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bistro-cli migrate
//!
//! # Seed role groups and a sample catalog
//! bistro-cli seed
//!
//! # Provision a staff account
//! bistro-cli staff create -u maria -e maria@example.com -p 'a long password' -r manager
//!
//! # Grant or revoke a role
//! bistro-cli staff grant -u joe -r delivery-crew
//! bistro-cli staff revoke -u joe -r delivery-crew
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed role groups, categories and menu items
//! - `staff` - Create accounts and manage role membership

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use sage_bistro_core::Role;

mod commands;

#[derive(Parser)]
#[command(name = "bistro-cli")]
#[command(author, version, about = "Sage Bistro CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed role groups and a sample catalog
    Seed,
    /// Manage staff accounts and roles
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a new account, optionally granting a role
    Create {
        /// Login username
        #[arg(short, long)]
        username: String,

        /// Contact email address
        #[arg(short, long)]
        email: String,

        /// Initial password
        #[arg(short, long)]
        password: String,

        /// Role to grant (`manager`, `delivery-crew`)
        #[arg(short, long)]
        role: Option<Role>,
    },
    /// Add an existing user to a role group
    Grant {
        /// Login username
        #[arg(short, long)]
        username: String,

        /// Role to grant (`manager`, `delivery-crew`)
        #[arg(short, long)]
        role: Role,
    },
    /// Remove a user from a role group
    Revoke {
        /// Login username
        #[arg(short, long)]
        username: String,

        /// Role to revoke (`manager`, `delivery-crew`)
        #[arg(short, long)]
        role: Role,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Staff { action } => match action {
            StaffAction::Create {
                username,
                email,
                password,
                role,
            } => {
                commands::staff::create_user(&username, &email, &password, role).await?;
            }
            StaffAction::Grant { username, role } => {
                commands::staff::grant_role(&username, role).await?;
            }
            StaffAction::Revoke { username, role } => {
                commands::staff::revoke_role(&username, role).await?;
            }
        },
    }
    Ok(())
}
