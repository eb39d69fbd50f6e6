//! MCP server for the FI calculation tools.
//!
//! This crate implements the Model Context Protocol over newline-delimited
//! JSON-RPC 2.0, serving a [`fi_tools::Catalog`] as tools and its docstrings
//! as `fi://help/{name}` resources.
//!
//! # Architecture
//!
//! - **types**: JSON-RPC 2.0 and MCP protocol types
//! - **transport**: Pluggable transport layer (stdio, channels)
//! - **server**: Request handling over a shared catalog
//! - **error**: Protocol error types
//!
//! # Usage
//!
//! ```no_run
//! use fi_server::{McpServer, StdioTransport};
//! use fi_tools::{Catalog, CatalogOptions};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = CatalogOptions::new(fi_calc::MODULE_NAME).with_tool_prefix("fi_");
//! let catalog = Arc::new(Catalog::build(&fi_calc::library(), options)?);
//! let mut server = McpServer::new(catalog);
//! server.run(&mut StdioTransport::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod server;
pub mod transport;
pub mod types;

pub use error::McpError;
pub use server::McpServer;
pub use transport::{ChannelTransport, McpTransport, StdioTransport};
pub use types::*;
