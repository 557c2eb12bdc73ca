//! JSON frames pushed to connected WebSocket clients.

use serde::Serialize;

use crate::message::Message;

/// A server→client WebSocket frame.
///
/// Serialized as an internally-tagged JSON object: `{"type":"reload"}` or
/// `{"type":"message","data":"..."}`. Clients never send envelopes back;
/// inbound socket traffic is logged and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    /// Tell clients to reload the page.
    Reload,

    /// Relay a newly accepted message.
    Message {
        /// The sanitized message text.
        data: String,
    },
}

impl Envelope {
    /// Build a message envelope from a validated message.
    pub fn message(message: &Message) -> Self {
        Self::Message { data: message.as_str().to_owned() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_wire_format() {
        let json = serde_json::to_string(&Envelope::Reload).unwrap();
        assert_eq!(json, r#"{"type":"reload"}"#);
    }

    #[test]
    fn message_wire_format() {
        let env = Envelope::Message { data: "hi".into() };
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"type":"message","data":"hi"}"#);
    }

    #[test]
    fn message_from_validated() {
        let msg = Message::parse("<b>").unwrap();
        let env = Envelope::message(&msg);
        assert_eq!(env, Envelope::Message { data: "&lt;b&gt;".into() });
    }
}
