//! FileVault Server: ordered file collections with upload, tagging,
//! sharing and usage stats.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use filevault_api::AppState;
use filevault_auth::JwtEncoder;
use filevault_core::config::{AppConfig, DatabaseProvider};
use filevault_core::error::AppError;
use filevault_core::traits::storage::StorageProvider;
use filevault_core::types::OwnerId;
use filevault_database::{DatabasePool, FileRepository, MemoryFileRepository, PgFileRepository};
use filevault_storage::LocalStorageProvider;

/// FileVault: ordered file collections over HTTP
#[derive(Debug, Parser)]
#[command(name = "filevault-server", version, about, long_about = None)]
struct Cli {
    /// Environment overlay loaded after config/default (config/{env}.toml)
    #[arg(long, env = "FILEVAULT_ENV", default_value = "development")]
    config_env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
        /// Override server.host
        #[arg(long)]
        host: Option<String>,
    },
    /// Print a bearer token for an owner
    Token {
        /// Owner to sign for; a new random owner when omitted
        #[arg(long)]
        owner: Option<OwnerId>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match load_configuration(&cli.config_env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve {
        port: None,
        host: None,
    }) {
        Commands::Serve { port, host } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            init_logging(&config);
            run(config).await
        }
        Commands::Token { owner } => print_token(&config, owner.unwrap_or_default()),
    };

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Sign a token for `owner` and print it.
fn print_token(config: &AppConfig, owner: OwnerId) -> Result<(), AppError> {
    let issued = JwtEncoder::new(&config.auth).issue(owner)?;
    println!("owner:   {owner}");
    println!("expires: {}", issued.expires_at.to_rfc3339());
    println!("token:   {}", issued.token);
    Ok(())
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting FileVault v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: File store ───────────────────────────────────────
    let file_repo: Arc<dyn FileRepository> = match config.database.provider {
        DatabaseProvider::Postgres => {
            tracing::info!("Connecting to database...");
            let db = DatabasePool::connect(&config.database).await?;
            Arc::new(PgFileRepository::new(db.into_pool()))
        }
        DatabaseProvider::Memory => {
            tracing::warn!("Using in-memory file store; records are lost on shutdown");
            Arc::new(MemoryFileRepository::new())
        }
    };
    tracing::info!(backend = file_repo.backend(), "File store ready");

    // ── Step 2: Storage provider ─────────────────────────────────
    tracing::info!(
        "Initializing local storage at '{}'...",
        config.storage.upload_dir
    );
    let provider: Arc<dyn StorageProvider> =
        Arc::new(LocalStorageProvider::new(&config.storage.upload_dir).await?);

    // ── Step 3: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, file_repo, provider);

    filevault_api::serve(state, &addr, shutdown_signal()).await?;

    tracing::info!("FileVault server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
