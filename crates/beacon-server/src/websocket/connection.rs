//! WebSocket upgrade handshake and per-connection read/write loops.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use metrics::counter;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::bearer_matches;
use crate::error::ApiError;
use crate::state::AppState;

use super::registry::Broadcaster;

/// Per-connection outbound queue depth. Sends never block: when the queue is
/// full the frame is dropped and counted against the connection.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// One live client connection.
///
/// The handle the registry holds: an identity, a bounded sender into the
/// connection's writer task, and a lifetime drop counter. The socket itself
/// is owned by the connection's loops, never by the registry.
pub struct ClientConnection {
    /// Unique connection ID (uuid v7).
    pub id: String,
    sender: mpsc::Sender<Arc<String>>,
    drops: AtomicU64,
}

impl ClientConnection {
    /// Wrap an outbound queue sender as a registrable connection.
    pub fn new(id: String, sender: mpsc::Sender<Arc<String>>) -> Self {
        Self { id, sender, drops: AtomicU64::new(0) }
    }

    /// Enqueue a serialized frame without blocking.
    ///
    /// Returns false when the queue is full or the writer is gone; each
    /// failure increments the lifetime drop count.
    pub fn send(&self, payload: Arc<String>) -> bool {
        match self.sender.try_send(payload) {
            Ok(()) => true,
            Err(_) => {
                let _ = self.drops.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Total frames dropped for this connection so far.
    pub fn drop_count(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }
}

/// `/ws` handler: validate upgrade intent, optionally check the credential,
/// then hand the socket to [`serve_connection`].
///
/// A request without the upgrade handshake headers gets 400 and no upgrade
/// is attempted.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if state.ws_requires_auth && !bearer_matches(&headers, &state.auth_key) {
        return ApiError::Forbidden.into_response();
    }

    match upgrade {
        Ok(upgrade) => {
            let broadcaster = Arc::clone(&state.broadcaster);
            upgrade.on_upgrade(move |socket| serve_connection(socket, broadcaster))
        }
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "rejected non-upgrade request to /ws");
            ApiError::UpgradeRequired.into_response()
        }
    }
}

/// Drive one upgraded socket until the peer closes or errors.
///
/// Registration happens before the loops start, so no broadcast can race an
/// unregistered handle. Peer close, socket error, and writer failure all
/// converge on the same idempotent unregister.
async fn serve_connection(socket: WebSocket, broadcaster: Arc<Broadcaster>) {
    let (sender, mut outbound) = mpsc::channel::<Arc<String>>(OUTBOUND_QUEUE_CAPACITY);
    let connection = Arc::new(ClientConnection::new(Uuid::now_v7().to_string(), sender));
    let conn_id = connection.id.clone();

    broadcaster.register(connection).await;
    counter!("ws_connections_total").increment(1);
    debug!(conn_id = %conn_id, "websocket client connected");

    let (mut sink, mut stream) = socket.split();

    let writer_conn_id = conn_id.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(payload) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(payload.as_str().into())).await {
                debug!(conn_id = %writer_conn_id, error = %e, "websocket send failed");
                break;
            }
        }
    });

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    // Observed, never interpreted: the HTTP routes are the
                    // only writers to shared state.
                    debug!(conn_id = %conn_id, len = text.len(), "ignoring inbound client frame");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // ping/pong answered by axum
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "websocket error");
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    broadcaster.unregister(&conn_id).await;
    counter!("ws_disconnections_total").increment(1);
    writer.abort();
    debug!(conn_id = %conn_id, "websocket client disconnected");
}
