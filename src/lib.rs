//! Financial-independence calculations served as MCP tools.
//!
//! ```no_run
//! use fi_mcp::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::from_env()?;
//! settings.tracing_setup().init();
//! let catalog = Catalog::build(&fi_mcp::fi_calc::library(), settings.catalog_options())?;
//! McpServer::new(Arc::new(catalog)).run(&mut StdioTransport::new()).await?;
//! # Ok(())
//! # }
//! ```

pub use fi_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use fi_internal::prelude::*;
}
