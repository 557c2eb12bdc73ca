//! # beacon-core
//!
//! Foundation types for the Beacon live-update server.
//!
//! This crate holds everything the server crate needs that is pure logic
//! with no I/O:
//!
//! - **Sanitizer**: [`sanitize::sanitize`] HTML-entity escaping and
//!   [`sanitize::utf16_len`] length semantics
//! - **Messages**: [`message::Message`] (validated, sanitized text) and
//!   [`message::MessageLog`] (append-only in-memory store)
//! - **Envelopes**: [`envelope::Envelope`] JSON frames pushed to WebSocket
//!   clients
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `beacon-server`.

#![deny(unsafe_code)]

pub mod envelope;
pub mod message;
pub mod sanitize;

pub use envelope::Envelope;
pub use message::{Message, MessageLog, ValidationError};
