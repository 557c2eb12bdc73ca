//! Bearer credential check for protected routes.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// Middleware: reject the request with 403 unless it carries
/// `Authorization: Bearer <key>` matching the shared credential exactly.
///
/// Runs before the protected handler, so a failed check never reaches any
/// state-mutating code.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if bearer_matches(request.headers(), &state.auth_key) {
        next.run(request).await
    } else {
        ApiError::Forbidden.into_response()
    }
}

/// Exact string comparison of the presented bearer token against the key.
pub fn bearer_matches(headers: &HeaderMap, key: &str) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .is_some_and(|token| token == key)
}
