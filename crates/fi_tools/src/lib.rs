//! Financial-independence functions as protocol tools.
//!
//! This crate turns an ordinary Rust module of calculation functions into a
//! catalog of typed tool schemas, dispatches tool calls back into those
//! functions, and serves each function's doc comment as a help resource.
//!
//! # Quick Start
//!
//! ```ignore
//! use fi_tools::{Catalog, CatalogOptions, Dispatcher, Library, fi_module};
//!
//! #[fi_module]
//! pub mod calc {
//!     /// Doubles a number.
//!     ///
//!     /// ### Args:
//!     /// - **x**: The number to double.
//!     ///
//!     /// ### Returns:
//!     /// Twice `x`.
//!     pub fn double(x: f64) -> f64 {
//!         x * 2.0
//!     }
//! }
//!
//! let library = Library::new().with_module(calc::module());
//! let catalog = std::sync::Arc::new(Catalog::build(&library, CatalogOptions::new("calc"))?);
//! let result = Dispatcher::new(catalog).invoke("double", &serde_json::json!({"x": 2}));
//! ```
//!
//! # Architecture
//!
//! - [`Module`] / [`FunctionRecord`] — static descriptor tables (via `#[fi_module]`)
//! - [`ParsedDocstring`] — markdown doc comment parsing
//! - [`validate_all`] — docstring compliance rules
//! - [`Library`] — module registry and function discovery
//! - [`NativeType`] / [`NativeValue`] — type mapping and value conversion
//! - [`generate_schema`] / [`ToolSchema`] — tool schema generation
//! - [`convert_arguments`] — argument conversion and validation
//! - [`Catalog`] — the immutable result of the start-up pipeline
//! - [`Dispatcher`] — tool invocation
//! - [`ResourceProvider`] — `fi://help/{name}` documentation

// Self-reference so `#[fi_module]` generated code can use `fi_tools::` paths within this crate.
extern crate self as fi_tools;

pub mod catalog;
pub mod discovery;
pub mod dispatch;
pub mod docstring;
pub mod error;
pub mod function;
pub mod param;
pub mod resource;
pub mod schema;
pub mod types;
pub mod validation;

// Re-export core types at crate root.
pub use catalog::{Catalog, CatalogEntry, CatalogOptions, DocPolicy, SkipReason};
pub use discovery::{Discovery, DiscoveryOptions, Exclusion, Library};
pub use dispatch::{Dispatcher, FailureKind, InvocationFailure, InvocationResult};
pub use docstring::{DocSection, ParsedDocstring};
pub use error::{
    ArgumentError, CatalogError, ConversionError, DiscoveryError, ExecutionError,
    MalformedDocstring, ResourceError, SchemaError, UnsupportedType,
};
pub use function::{
    FunctionRecord, Invoker, Module, ParamSpec, ReturnKind, ReturnValue, Signature, Visibility,
};
pub use param::{InvocationRequest, UnknownArguments, convert_arguments};
pub use resource::{ResourceDescriptor, ResourceProvider, display_name};
pub use schema::{ParameterSchema, SchemaOptions, ToolSchema, generate_schema};
pub use types::{
    FromNative, IntoNative, NativeType, NativeValue, native_to_schema, schema_value_to_native,
};
pub use validation::{Rule, ValidationReport, Violation, validate_all, validate_function};

// Re-export proc macros.
pub use fi_macros::fi_module;
