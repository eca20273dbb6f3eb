//! Roastline CLI - Operational tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the session-store table (cart durability)
//! roastline-cli sessions migrate
//!
//! # Seed the coffee catalog into the backend
//! roastline-cli seed --file demos/catalog.json
//!
//! # Check configuration and backend reachability
//! roastline-cli check
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "roastline-cli")]
#[command(author, version, about = "Roastline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the session store
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Seed the coffee catalog into the backend
    Seed {
        /// Path to a JSON file with an array of catalog rows
        #[arg(short, long)]
        file: String,
    },
    /// Check configuration and backend reachability
    Check,
}

#[derive(Subcommand)]
enum SessionsAction {
    /// Create the session-store table
    Migrate,
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
        Commands::Sessions { action } => match action {
            SessionsAction::Migrate => commands::sessions::migrate().await?,
        },
        Commands::Seed { file } => commands::seed::catalog(&file).await?,
        Commands::Check => commands::check::run().await?,
    }
    Ok(())
}
