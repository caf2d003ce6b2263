mod backend;
mod config;
mod error;
mod handlers;
mod objects;
mod routes;
mod server;
mod session;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use backend::StoreBackend;
use config::ServerConfig;
use objects::DiskObjectStore;
use server::AppServer;
use stockroom_storage::{CreatePrincipalParams, Role, Store, StoreError};
use stockroom_store_memory::MemoryStore;
use stockroom_store_sqlite::SqliteStore;

// ────────────────────────────────────── CLI Types ──────────────────────────────────────

#[derive(Parser)]
#[command(name = "stockroom-server")]
#[command(about = "Stockroom server CLI for administration and serving")]
struct Cli {
    /// Database URL (sqlite://path/to/db.db or memory://)
    #[arg(long, global = true, env = "STOCKROOM_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Server address
        #[arg(long, env = "STOCKROOM_ADDR")]
        addr: Option<String>,

        /// Directory product images are written to
        #[arg(long, env = "STOCKROOM_UPLOADS_DIR")]
        uploads_dir: Option<PathBuf>,
    },
    /// Admin account management
    Admin {
        #[command(subcommand)]
        admin_cmd: AdminCommand,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Create an admin account (for bootstrapping)
    Create {
        #[arg(long)]
        username: String,
        /// Raw secret; hashed before it is stored
        #[arg(long, env = "STOCKROOM_ADMIN_SECRET")]
        secret: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }

    match cli.command {
        Command::Serve { addr, uploads_dir } => {
            if let Some(addr) = addr {
                config.addr = addr;
            }
            if let Some(dir) = uploads_dir {
                config.uploads_dir = dir;
            }
            cmd_serve(config).await
        }
        Command::Admin { admin_cmd } => match admin_cmd {
            AdminCommand::Create { username, secret } => {
                cmd_admin_create(&config.database_url, &username, &secret).await
            }
        },
    }
}

/// Open the store named by the URL scheme.
async fn open_backend(url: &str) -> Result<StoreBackend, StoreError> {
    if url.starts_with("memory:") {
        Ok(StoreBackend::Memory(Arc::new(MemoryStore::new())))
    } else {
        let store = SqliteStore::open(url).await?;
        Ok(StoreBackend::Sqlite(Arc::new(store)))
    }
}

/// Startup-only connection retry with doubling backoff. Failures after
/// startup surface per request instead.
async fn open_backend_with_retry(url: &str) -> Result<StoreBackend, StoreError> {
    const ATTEMPTS: u32 = 5;
    let mut delay = Duration::from_secs(1);
    for attempt in 1..=ATTEMPTS {
        match open_backend(url).await {
            Ok(backend) => return Ok(backend),
            Err(e) if attempt < ATTEMPTS => {
                tracing::warn!(attempt, error = %e, "store connection failed, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
    unreachable!("retry loop returns on the last attempt")
}

async fn cmd_serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend = open_backend_with_retry(&config.database_url).await?;
    let objects = Arc::new(DiskObjectStore::new(config.uploads_dir.clone()));

    let server = match backend {
        StoreBackend::Sqlite(ref s) => AppServer::new_sqlite(s.clone(), objects, config.clone()),
        StoreBackend::Memory(ref s) => AppServer::new_memory(s.clone(), objects, config.clone()),
    };

    let app = routes::router(server);
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    tracing::info!("stockroom-server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}

async fn cmd_admin_create(
    database_url: &str,
    username: &str,
    secret: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = open_backend(database_url).await?;
    let secret_hash = stockroom_crypto::hash_secret(secret)?;

    let principal = backend
        .create_principal(&CreatePrincipalParams {
            username: username.to_string(),
            secret_hash,
            role: Role::Admin,
        })
        .await
        .map_err(|e| -> Box<dyn std::error::Error> {
            match e {
                StoreError::AlreadyExists => format!("admin '{}' already exists", username).into(),
                other => other.to_string().into(),
            }
        })?;

    println!("Created admin '{}' ({})", principal.username, principal.id.0);
    Ok(())
}
