//! Shared handles passed to every handler.

use std::sync::Arc;

use beacon_core::MessageLog;

use crate::websocket::registry::Broadcaster;

/// Process-wide state injected into the router.
///
/// The message log and the connection registry are the only shared mutable
/// resources; both are single-instance with process lifetime. Cloning the
/// state clones handles, never the data.
#[derive(Clone)]
pub struct AppState {
    /// Connection registry + broadcast relay.
    pub broadcaster: Arc<Broadcaster>,
    /// Append-only accepted-message log.
    pub messages: Arc<MessageLog>,
    /// Shared bearer credential, loaded once at startup.
    pub auth_key: Arc<str>,
    /// Whether the WebSocket upgrade handshake also requires the credential.
    pub ws_requires_auth: bool,
}

impl AppState {
    /// Fresh state with an empty log and registry.
    ///
    /// The WebSocket endpoint is open by default (read-only subscription for
    /// anyone, writes require the credential); see [`Self::with_ws_auth`].
    pub fn new(auth_key: impl Into<Arc<str>>) -> Self {
        Self {
            broadcaster: Arc::new(Broadcaster::new()),
            messages: Arc::new(MessageLog::new()),
            auth_key: auth_key.into(),
            ws_requires_auth: false,
        }
    }

    /// Extend the bearer check to the WebSocket upgrade handshake.
    pub fn with_ws_auth(mut self, required: bool) -> Self {
        self.ws_requires_auth = required;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_open_by_default() {
        let state = AppState::new("secret");
        assert!(!state.ws_requires_auth);
    }

    #[test]
    fn ws_auth_opt_in() {
        let state = AppState::new("secret").with_ws_auth(true);
        assert!(state.ws_requires_auth);
    }

    #[test]
    fn clones_share_the_log() {
        let state = AppState::new("secret");
        let other = state.clone();
        state.messages.append(beacon_core::Message::parse("hi").unwrap());
        assert_eq!(other.messages.len(), 1);
    }
}
