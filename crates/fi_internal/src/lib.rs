//! # fi_mcp Internal Library
//!
//! Re-exports the fi_mcp crates for convenience.

/// Docstring-driven tool catalog: discovery, schemas, dispatch and help.
pub use fi_tools;

/// The financial-independence calculations.
pub use fi_calc;

/// Settings, tracing and server identity.
pub use fi_core;

/// The MCP protocol runtime.
pub use fi_server;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use fi_core::{Settings, TracingFormat, TracingSetup};
    pub use fi_server::{McpServer, StdioTransport};
    pub use fi_tools::{
        Catalog, CatalogOptions, Dispatcher, DocPolicy, InvocationResult, Library,
        ResourceProvider, UnknownArguments, fi_module,
    };
}
