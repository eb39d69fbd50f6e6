//! Server identity reported to protocol clients.

use serde::Serialize;

/// Server runtime information.
///
/// # Fields
///
/// - `name` - The server name announced during the protocol handshake
/// - `version` - The crate version from `Cargo.toml`
/// - `debug` - Whether the server was compiled in debug mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: &'static str,
    /// Version string.
    pub version: &'static str,
    /// Whether running in debug mode.
    #[serde(skip)]
    pub debug: bool,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "fi-mcp",
            version: env!("CARGO_PKG_VERSION"),
            debug: cfg!(debug_assertions),
        }
    }
}
