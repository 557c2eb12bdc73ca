//! Server configuration.

use std::path::PathBuf;

/// Listen address and static root for the server.
///
/// The shared bearer credential is not part of this struct; it comes from
/// the environment at startup and lives in [`crate::state::AppState`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind (0 for auto-assign).
    pub port: u16,
    /// Root directory for the static-file delegate.
    pub static_root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_root: PathBuf::from("./public"),
        }
    }
}
