//! Server lifecycle: bind, serve, graceful shutdown.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::routes::router;
use crate::state::AppState;

/// Errors binding or serving the listener.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind or inspect the configured address.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The assembled server: config + shared state + a shutdown token.
pub struct BeaconServer {
    config: ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
}

impl BeaconServer {
    /// Assemble a server; nothing binds until [`Self::listen`].
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state, shutdown: CancellationToken::new() }
    }

    /// Bind the listener and start serving on a background task.
    ///
    /// Returns the bound address (useful with port 0) and the serve task's
    /// join handle. The task runs until the shutdown token is cancelled.
    pub async fn listen(&self) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
        let app = router(self.state.clone(), &self.config.static_root);
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;

        let token = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            let shutdown = async move { token.cancelled().await };
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
                error!(error = %e, "server terminated with error");
            }
        });

        info!(%addr, "server listening");
        Ok((addr, handle))
    }

    /// Token that stops the serve loop when cancelled.
    pub fn shutdown(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
