//! crmsync CLI - operator interface for the CRM sync engine.

mod commands;
mod config;
mod progress;
mod shutdown;

use clap::{CommandFactory, Parser, Subcommand};
use console::Term;
use crmsync::RunStatus;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crmsync")]
#[command(version)]
#[command(about = "Sync CRM data into a local reporting database")]
#[command(
    long_about = "crmsync pulls deals, contacts, accounts, products and sales activities \
from a Freshsales-style CRM API and upserts them into a local SQLite or \
PostgreSQL database, keyed by the remote identifier so repeated runs \
converge instead of duplicating."
)]
#[command(after_long_help = r#"EXAMPLES
    Run a full sync of every resource type:
        $ crmsync sync

    Sync only deals and contacts, politely:
        $ crmsync sync deals contacts --page-delay-ms 1000

    Print per-resource row counts:
        $ crmsync status

    Emit the run report as JSON for a scheduler:
        $ crmsync sync --json

CONFIGURATION
    crmsync reads configuration from:
      1. ~/.config/crmsync/config.toml (or $XDG_CONFIG_HOME/crmsync/config.toml)
      2. ./crmsync.toml
      3. Environment variables (CRMSYNC_* prefix)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    CRMSYNC_DATABASE_URL   Database connection string (default: ~/.local/state/crmsync/crmsync.db)
    CRMSYNC_CRM_URL        CRM API base URL (e.g. https://acme.myfreshworks.com/crm/sales/api)
    CRMSYNC_CRM_KEY        CRM API key
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Run a sync pass over the configured resource types
    Sync {
        #[command(flatten)]
        opts: SyncOptions,
    },
    /// Show per-resource record counts in the destination store
    Status,
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

/// Options for the sync command.
#[derive(Debug, Clone, clap::Args)]
struct SyncOptions {
    /// Resource types to sync (default from config, or all)
    resources: Vec<String>,

    /// Minimum delay between paginated requests, in milliseconds
    #[arg(short = 'd', long)]
    page_delay_ms: Option<u64>,

    /// Safety bound on pages fetched per resource
    #[arg(short = 'p', long)]
    max_pages: Option<u32>,

    /// Overall timeout for one page fetch, in milliseconds
    #[arg(short = 't', long)]
    request_timeout_ms: Option<u64>,

    /// Print the run report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Set up graceful shutdown handler (Ctrl+C)
    let cancel = shutdown::setup_shutdown_handler();

    // Initialize tracing for non-TTY mode (structured logging)
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("crmsync=info,crmsync_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    // Completions don't need database access.
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    let database_url = config
        .database_url()
        .expect("Failed to determine database URL - this should not happen");

    // Ensure the database directory exists for SQLite
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        // Strip query parameters (e.g., ?mode=rwc) before path operations
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Sync { opts } => {
            let status =
                commands::sync::handle_sync(opts, &config, &database_url, cancel).await?;
            if status != RunStatus::Success {
                std::process::exit(1);
            }
        }
        Commands::Status => {
            commands::status::handle_status(&database_url).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
