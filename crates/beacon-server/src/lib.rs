//! # beacon-server
//!
//! Axum HTTP + WebSocket server for the Beacon live-update companion.
//!
//! Serves a static asset tree, accepts short text messages over a
//! bearer-protected endpoint, and fans out reload signals and accepted
//! messages to every connected WebSocket client.
//!
//! ## Architecture
//!
//! ```text
//! beacon-server
//!   ├─ routes      (router assembly: /ws, /reload, /send-message, /messages, static fallback)
//!   ├─ auth        (bearer credential middleware)
//!   ├─ headers     (fixed security header set on every response)
//!   ├─ websocket   (connection lifecycle + broadcast fan-out)
//!   ├─ server      (bind/listen/shutdown lifecycle)
//!   └─ beacon-core (sanitizer, message log, envelopes)
//! ```

#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod headers;
pub mod routes;
pub mod server;
pub mod state;
pub mod websocket;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{BeaconServer, ServerError};
pub use state::AppState;
