//! # beacon-server binary
//!
//! Wires config, state, and the HTTP/WebSocket server together and runs
//! until ctrl-c.

#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use beacon_server::config::ServerConfig;
use beacon_server::server::BeaconServer;
use beacon_server::state::AppState;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Live-update broadcast server for static sites.
#[derive(Parser, Debug)]
#[command(name = "beacon-server", about = "Live-update broadcast server for static sites")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Root directory served to browsers (created if missing).
    #[arg(long, default_value = "./public")]
    static_root: PathBuf,

    /// Require the bearer credential on the WebSocket endpoint too.
    #[arg(long)]
    ws_auth: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Fail fast: the shared credential is the only mandatory configuration.
    let auth_key =
        std::env::var("AUTH_KEY").context("AUTH_KEY is not set in the environment")?;

    tokio::fs::create_dir_all(&args.static_root)
        .await
        .with_context(|| {
            format!("Failed to create static root: {}", args.static_root.display())
        })?;

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        static_root: args.static_root,
    };
    let state = AppState::new(auth_key).with_ws_auth(args.ws_auth);

    let server = BeaconServer::new(config, state);
    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!("Beacon listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().cancel();
    let _ = handle.await;
    Ok(())
}
