//! Core infrastructure for the FI tool server.
//!
//! This crate provides the ambient pieces every entry point needs:
//!
//! - [`Settings`] - Environment and `.env` driven configuration
//! - [`TracingSetup`] - Logging and observability via the `tracing` crate
//! - [`ServerInfo`] - Name and version announced to protocol clients
//!
//! # Example
//!
//! ```no_run
//! use fi_core::Settings;
//!
//! let settings = Settings::from_env().expect("valid FI_MCP_* variables");
//! settings.tracing_setup().init();
//! let options = settings.catalog_options();
//! assert_eq!(options.module, settings.module);
//! ```

mod config;
mod server_info;
mod tracing_setup;

pub use config::{ConfigError, DEFAULT_MODULE, Settings};
pub use server_info::ServerInfo;
pub use tracing_setup::{TracingFormat, TracingSetup};
