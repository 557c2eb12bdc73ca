//! Validated messages and the append-only in-memory log.
//!
//! [`Message`] can only be constructed through [`Message::parse`], so every
//! value that reaches the [`MessageLog`] has already been trimmed, sanitized,
//! and length-checked. The log never contains raw input.

use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

use crate::sanitize::{sanitize, utf16_len};

/// Minimum accepted message length (UTF-16 code units, post-sanitization).
pub const MIN_MESSAGE_LEN: usize = 2;
/// Maximum accepted message length (UTF-16 code units, post-sanitization).
pub const MAX_MESSAGE_LEN: usize = 600;

/// Why a submitted message was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Message was empty (or whitespace-only) before sanitization.
    #[error("message must be a non-empty string")]
    Empty,

    /// Sanitized message length fell outside the accepted bounds.
    #[error("message must be between {min} and {max} characters (got {actual})")]
    Length {
        /// Lower bound, inclusive.
        min: usize,
        /// Upper bound, inclusive.
        max: usize,
        /// Observed sanitized length in UTF-16 code units.
        actual: usize,
    },
}

/// A sanitized, length-checked message.
///
/// Immutable once created; serializes as its inner string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Message(String);

impl Message {
    /// Validate raw input into a `Message`.
    ///
    /// Pipeline, each step a hard gate: trim, reject empty, sanitize, then
    /// check `2..=600` UTF-16 code units. A failing gate short-circuits
    /// without producing a value, so nothing unvalidated can be stored.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        let sanitized = sanitize(trimmed);
        let actual = utf16_len(&sanitized);
        if !(MIN_MESSAGE_LEN..=MAX_MESSAGE_LEN).contains(&actual) {
            return Err(ValidationError::Length {
                min: MIN_MESSAGE_LEN,
                max: MAX_MESSAGE_LEN,
                actual,
            });
        }

        Ok(Self(sanitized))
    }

    /// The sanitized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the sanitized text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Append-only, in-memory, process-lifetime message store.
///
/// Insertion order is arrival order; entries are never mutated or removed.
/// Append and snapshot are short synchronous critical sections; the lock is
/// never held across an await point.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: RwLock<Vec<Message>>,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn append(&self, message: Message) {
        self.entries.write().push(message);
    }

    /// Point-in-time copy of all messages, in arrival order.
    pub fn snapshot(&self) -> Vec<Message> {
        self.entries.read().clone()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
