//! Error types for the catalog pipeline.
//!
//! Start-up errors ([`DiscoveryError`], [`SchemaError`], [`CatalogError`]) are
//! reported once while the catalog is built. Per-request errors
//! ([`ArgumentError`], [`ConversionError`], [`ExecutionError`]) are isolated to
//! a single invocation and surfaced as a failed
//! [`InvocationResult`](crate::dispatch::InvocationResult).

use crate::validation::ValidationReport;
use thiserror::Error;

/// Errors raised while locating or enumerating a target module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// No module with the requested name is registered in the library.
    #[error("module `{name}` not found (available: {available})")]
    ModuleNotFound {
        /// The requested module name.
        name: String,
        /// Comma separated list of registered modules.
        available: String,
    },

    /// Two functions in the same module share a name.
    #[error("module `{module}` declares `{name}` more than once")]
    DuplicateFunction {
        /// Module name.
        module: String,
        /// Conflicting function name.
        name: String,
    },

    /// Every function in the module was excluded.
    #[error("module `{module}` has no tool-eligible functions")]
    NoEligibleFunctions {
        /// Module name.
        module: String,
    },
}

/// A docstring lacks the structure its signature requires.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedDocstring {
    /// The docstring is empty or whitespace only.
    #[error("function is missing a docstring")]
    Missing,

    /// Required parameters exist but no parameters section was found.
    #[error("no parameters section documenting {}", .parameters.join(", "))]
    MissingParametersSection {
        /// The required parameters left undocumented.
        parameters: Vec<String>,
    },

    /// A recognized section header appears more than once.
    #[error("section `{0}` appears more than once")]
    DuplicateSection(String),

    /// A bullet in the parameters section is not shaped `name: description`.
    #[error("unrecognized parameter entry: `{line}`")]
    MalformedEntry {
        /// The offending line, trimmed.
        line: String,
    },
}

/// A native type has no protocol schema representation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported parameter type `{type_name}`")]
pub struct UnsupportedType {
    /// The Rust type as written in the signature.
    pub type_name: String,
}

/// Errors generating a [`ToolSchema`](crate::schema::ToolSchema).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A parameter type cannot be mapped to a schema type.
    #[error("`{function}`: parameter `{parameter}` has unsupported type `{type_name}`")]
    UnsupportedType {
        /// Function name.
        function: String,
        /// Parameter name.
        parameter: String,
        /// The Rust type as written.
        type_name: String,
    },

    /// The function has no describable signature.
    #[error("`{function}` has no describable signature")]
    Undescribed {
        /// Function name.
        function: String,
    },
}

/// A single raw value could not be decoded into its native type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    /// The JSON value has the wrong shape for the expected type.
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        /// Expected schema type.
        expected: String,
        /// Description of the value received.
        found: String,
    },

    /// An integer parameter received a fractional value.
    #[error("expected an integer, got fractional value {0}")]
    Fractional(f64),

    /// The value does not fit the target Rust type.
    #[error("value {value} is out of range for {target}")]
    OutOfRange {
        /// The rejected value.
        value: String,
        /// The target Rust type.
        target: &'static str,
    },

    /// NaN or infinite numbers.
    #[error("expected a finite number")]
    NotFinite,

    /// A choice parameter received a value outside its set.
    #[error("`{value}` is not one of: {}", .choices.join(", "))]
    InvalidChoice {
        /// The rejected value.
        value: String,
        /// The allowed values.
        choices: Vec<String>,
    },

    /// The parameter type itself is unsupported.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedType),
}

impl ConversionError {
    pub(crate) fn mismatch(expected: impl Into<String>, found: &serde_json::Value) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: describe_value(found),
        }
    }
}

/// Short human description of a JSON value for error messages.
pub(crate) fn describe_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => format!("boolean {b}"),
        serde_json::Value::Number(n) => format!("number {n}"),
        serde_json::Value::String(s) => format!("string {s:?}"),
        serde_json::Value::Array(_) => "array".to_string(),
        serde_json::Value::Object(_) => "object".to_string(),
    }
}

/// Errors converting a full argument set for one invocation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ArgumentError {
    /// One or more required parameters were not supplied.
    #[error("missing required argument(s): {}", .parameters.join(", "))]
    Missing {
        /// Missing parameter names, in declaration order.
        parameters: Vec<String>,
    },

    /// Arguments not declared by the function were supplied.
    #[error("unknown argument(s): {}", .arguments.join(", "))]
    Unknown {
        /// Unrecognized argument names, sorted.
        arguments: Vec<String>,
    },

    /// A supplied argument could not be converted.
    #[error("invalid value for parameter `{parameter}`: {source}")]
    Conversion {
        /// Parameter name.
        parameter: String,
        /// Underlying conversion failure.
        #[source]
        source: ConversionError,
    },

    /// The argument payload is not a JSON object.
    #[error("arguments must be a JSON object, got {found}")]
    NotAnObject {
        /// Description of the payload received.
        found: String,
    },
}

/// The target function failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ExecutionError {
    message: String,
}

impl ExecutionError {
    /// Creates an execution error carrying the function's own message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The original failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Fatal errors building the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The target module could not be discovered.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Strict documentation policy rejected the library.
    #[error("docstring validation failed with {count} violation(s):\n{0}", count = .0.len())]
    Validation(ValidationReport),

    /// Nothing survived schema generation.
    #[error("no tool schemas could be generated for module `{module}`")]
    Empty {
        /// Module name.
        module: String,
    },
}

/// Errors reading a documentation resource.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// No function with that name exists.
    #[error("unknown function: {0}")]
    NotFound(String),

    /// The URI is not of the form `fi://help/{name}`.
    #[error("unknown resource URI: {0}")]
    InvalidUri(String),
}
