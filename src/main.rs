//! Binary entry point for recvault.
//!
//! This binary provides the CLI interface for the record vault.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use recvault::cli;
use recvault::config::{Backend, VaultConfig};
use recvault::io::Format;
use recvault::observability::{self, LoggingConfig};
use recvault::services::{RecordStore, SortKey, SortOrder};
use recvault::storage::{ConnectionManager, Connector, MemoryConnector, PostgresConnector};
use recvault::RecordId;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// recvault - a personal record vault.
#[derive(Parser)]
#[command(name = "recvault")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "RECVAULT_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Collection backend (overrides configuration).
    #[arg(long, global = true)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Add a record.
    Add {
        /// Record name.
        name: String,
        /// Record value.
        value: String,
    },

    /// List records.
    List {
        /// Sort key: id, name or created.
        #[arg(short, long)]
        sort: Option<SortKey>,

        /// Sort in descending order.
        #[arg(long)]
        desc: bool,
    },

    /// Overwrite a record's name and value.
    Update {
        /// Record id.
        id: RecordId,
        /// New name.
        name: String,
        /// New value.
        value: String,
    },

    /// Delete a record.
    Delete {
        /// Record id.
        id: RecordId,
    },

    /// Search records by name or id fragment.
    Search {
        /// Keyword to match.
        keyword: String,
    },

    /// Export records to a JSON or CSV file.
    Export {
        /// Output file.
        path: PathBuf,

        /// Output format (defaults to the file extension).
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Write a timestamped JSON backup.
    Backup {
        /// Backup directory (overrides configuration).
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Show vault statistics.
    Stats,

    /// Show configuration and connection status.
    Status,

    /// Run the interactive menu (default).
    Menu,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };
    let config = match cli.backend {
        Some(backend) => config.with_backend(backend),
        None => config,
    };

    let logging = LoggingConfig::from_settings(Some(&config.logging), cli.verbose);
    if let Err(e) = observability::init_logging(logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command.unwrap_or(Commands::Menu), config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Loads configuration from an explicit path or the default location, then
/// applies environment overrides.
fn load_config(path: Option<&Path>) -> anyhow::Result<VaultConfig> {
    let config = match path {
        Some(path) => VaultConfig::load_from_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => VaultConfig::load_default(),
    };
    Ok(config.with_env_overrides())
}

/// Builds the store for the configured backend and runs the command.
async fn run_command(command: Commands, config: VaultConfig) -> anyhow::Result<()> {
    match config.backend {
        Backend::Memory => {
            tracing::warn!("Using the in-memory backend; records are lost on exit");
            run_with(MemoryConnector::new(), command, &config).await
        },
        Backend::Postgres => {
            let url = config.require_database_url()?;
            let connector = PostgresConnector::new(url, config.collection.clone())?
                .with_connect_timeout(config.connection.attempt_timeout());
            run_with(connector, command, &config).await
        },
    }
}

async fn run_with<C: Connector>(
    connector: C,
    command: Commands,
    config: &VaultConfig,
) -> anyhow::Result<()> {
    let store = RecordStore::new(ConnectionManager::new(
        connector,
        config.connection.clone(),
    ));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Add { name, value } => cli::cmd_add(&store, &mut out, &name, &value).await?,
        Commands::List { sort, desc } => {
            let order = if desc {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            // --desc without --sort orders by id.
            let sort = sort.or(desc.then_some(SortKey::Id));
            cli::cmd_list(&store, &mut out, sort, order).await?;
        },
        Commands::Update { id, name, value } => {
            cli::cmd_update(&store, &mut out, id, &name, &value).await?;
        },
        Commands::Delete { id } => cli::cmd_delete(&store, &mut out, id).await?,
        Commands::Search { keyword } => cli::cmd_search(&store, &mut out, &keyword).await?,
        Commands::Export { path, format } => {
            cli::cmd_export(&store, &mut out, &path, format).await?;
        },
        Commands::Backup { dir } => {
            let dir = dir.unwrap_or_else(|| config.backup_dir.clone());
            cli::cmd_backup(&store, &mut out, &dir).await?;
        },
        Commands::Stats => cli::cmd_stats(&store, &mut out).await?,
        Commands::Status => cli::cmd_status(&store, &mut out, config).await?,
        Commands::Menu => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            cli::run_menu(&store, stdin, &mut out, &config.backup_dir).await?;
        },
    }

    Ok(())
}
