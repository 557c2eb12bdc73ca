//! Router assembly and HTTP handlers.
//!
//! Decision order, first match wins: `/ws` upgrade, bearer-protected
//! `/reload` + `/send-message`, open `/messages`, then the static-file
//! delegate for everything else (`/` maps to `index.html`).

use std::any::Any;
use std::path::Path;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::handler::HandlerWithoutStateExt;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{any, get, post};
use axum::{Json, Router};
use beacon_core::{Envelope, Message};
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::auth::require_bearer;
use crate::error::ApiError;
use crate::headers::security_headers;
use crate::state::AppState;
use crate::websocket::connection::ws_upgrade;

/// Build the full application router.
///
/// Layer order matters: panic containment sits inside the security-header
/// middleware so a converted panic response still carries the headers;
/// request tracing wraps everything.
pub fn router(state: AppState, static_root: &Path) -> Router {
    let protected = Router::new()
        .route("/reload", get(trigger_reload))
        .route("/send-message", post(submit_message))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    let static_files = ServeDir::new(static_root)
        .append_index_html_on_directories(true)
        .not_found_service(static_not_found.into_service());

    Router::new()
        .route("/ws", any(ws_upgrade))
        .merge(protected)
        .route("/messages", get(list_messages))
        .fallback_service(static_files)
        .layer(CatchPanicLayer::custom(contain_panic))
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReloadResponse {
    message: &'static str,
    clients_notified: usize,
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    message: &'static str,
    content: String,
    recipients: usize,
}

#[derive(Debug, Serialize)]
struct MessageListResponse {
    messages: Vec<Message>,
    count: usize,
}

/// `GET /reload` (bearer-protected): push a reload frame to every client.
async fn trigger_reload(State(state): State<AppState>) -> Json<ReloadResponse> {
    let clients_notified = state.broadcaster.broadcast(&Envelope::Reload).await;
    Json(ReloadResponse { message: "Reload triggered", clients_notified })
}

/// `POST /send-message` (bearer-protected): validate, store, then broadcast.
async fn submit_message(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidFormat(e.body_text()))?;
    let message = Message::parse(&request.message)?;

    // Append strictly before broadcasting: the log and any later listing are
    // always at least as current as a delivered frame.
    state.messages.append(message.clone());
    let recipients = state.broadcaster.broadcast(&Envelope::message(&message)).await;

    Ok(Json(SubmitResponse {
        message: "Message received",
        content: message.into_inner(),
        recipients,
    }))
}

/// `GET /messages`: the full log in arrival order plus its count.
///
/// `{"messages":[],"count":0}` is the unambiguous empty state.
async fn list_messages(State(state): State<AppState>) -> Json<MessageListResponse> {
    let messages = state.messages.snapshot();
    Json(MessageListResponse { count: messages.len(), messages })
}

/// Static-delegate miss: structured 404 instead of an empty body.
async fn static_not_found() -> ApiError {
    ApiError::NotFound
}

/// Convert a handler panic into the generic internal-error response.
///
/// The panic payload is logged server-side only.
fn contain_panic(panic: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("opaque panic payload");
    error!(detail, "handler panicked");
    ApiError::Internal.into_response()
}
