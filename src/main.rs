//! Todo API server.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                      TODO API                         │
//!                      │                                                       │
//!   Client Request     │  ┌──────────┐   ┌────────────┐   ┌───────────────┐   │
//!   ───────────────────┼─▶│  http    │──▶│ privilege  │──▶│   handlers    │   │
//!   x-user-id          │  │ server   │   │   gate     │   │  (validate)   │   │
//!   x-user-privilege   │  └──────────┘   └────────────┘   └──────┬────────┘   │
//!                      │                                          │            │
//!                      │                                          ▼            │
//!                      │                                  ┌───────────────┐    │
//!                      │                                  │    access     │    │
//!                      │                                  │   resolver    │    │
//!                      │                                  └──────┬────────┘    │
//!                      │                                         │             │
//!   Client Response    │  ┌──────────┐                   ┌──────▼────────┐    │
//!   ◀──────────────────┼──│ ApiError │◀──────────────────│  store        │    │
//!                      │  │ / JSON   │                   │  (SQLite)     │    │
//!                      │  └──────────┘                   └───────────────┘    │
//!                      │                                                       │
//!                      │  Cross-cutting: config · observability · lifecycle    │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use todo_api::config::loader::{load_config, load_from_env};
use todo_api::lifecycle::{signals, Shutdown};
use todo_api::observability::{logging, metrics};
use todo_api::store::SqliteStore;
use todo_api::HttpServer;

#[derive(Parser)]
#[command(name = "todo-api")]
#[command(about = "Todo list API server", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults plus TODO_API_* variables otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("todo-api v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        base_path = %config.listener.base_path,
        database = %config.database.path,
        request_timeout_secs = config.timeouts.request_secs,
        grants_allow_delete = config.access.grants_allow_delete,
        require_list_access_for_writes = config.access.require_list_access_for_writes,
        "Configuration loaded"
    );

    let store = Arc::new(SqliteStore::open(&config.database)?);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
