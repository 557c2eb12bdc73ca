//! WebSocket connection lifecycle and event fan-out.
//!
//! ## Submodules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `connection` | Upgrade handshake, per-connection read/write loops |
//! | `registry` | Connection registry + broadcast relay |
//!
//! ## Data Flow
//!
//! `connection` registers each upgraded socket with the `registry` before
//! its loops start. HTTP handlers call `registry::Broadcaster::broadcast`,
//! which enqueues the serialized envelope on every connection's bounded
//! outbound queue; each connection's writer task drains its queue into the
//! socket. Inbound client frames are logged and never interpreted.

pub mod connection;
pub mod registry;

pub use connection::ClientConnection;
pub use registry::Broadcaster;
