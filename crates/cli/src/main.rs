//! Fagot CLI - database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! fagot-cli migrate
//!
//! # Seed default settings and a demo catalog
//! fagot-cli seed
//!
//! # Seed settings only
//! fagot-cli seed --settings-only
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fagot-cli")]
#[command(author, version, about = "Fagot CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed default settings and a demo catalog
    Seed {
        /// Only seed the settings document, skip the demo catalog
        #[arg(long)]
        settings_only: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fagot_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { settings_only } => commands::seed::run(settings_only).await,
    };

    if let Err(e) = result {
        tracing::error!("command failed: {e}");
        std::process::exit(1);
    }
}
