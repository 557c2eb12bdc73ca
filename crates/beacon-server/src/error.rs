//! User-facing error responses.
//!
//! Every failure leaving a handler is one of these variants, rendered as a
//! structured JSON body `{"error": <kind>, "detail": <message>}`. Raw
//! internal faults are logged server-side and surfaced only as the generic
//! `internal` kind.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use beacon_core::ValidationError;
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the HTTP surface.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body was not the expected JSON shape.
    #[error("{0}")]
    InvalidFormat(String),

    /// Message failed validation (empty or out-of-bounds length).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Bearer credential missing or mismatched.
    #[error("missing or invalid bearer credential")]
    Forbidden,

    /// The `/ws` request did not declare a WebSocket upgrade.
    #[error("request is not a websocket upgrade")]
    UpgradeRequired,

    /// Static resource not found.
    #[error("resource not found")]
    NotFound,

    /// Unexpected fault inside a handler; details stay server-side.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    /// Machine-readable error kind for the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) | Self::Validation(ValidationError::Empty) => "invalid_format",
            Self::Validation(ValidationError::Length { .. }) => "invalid_length",
            Self::Forbidden => "forbidden",
            Self::UpgradeRequired => "upgrade_required",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidFormat(_) | Self::Validation(_) | Self::UpgradeRequired => {
                StatusCode::BAD_REQUEST
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind(),
            "detail": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}
