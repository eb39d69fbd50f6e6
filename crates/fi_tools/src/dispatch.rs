//! Tool invocation.
//!
//! [`Dispatcher::invoke`] is the only entry point the protocol runtime uses to
//! run a function. Every failure, including a panic inside the function, comes
//! back as an [`InvocationResult::Failure`].

use crate::catalog::Catalog;
use crate::error::ArgumentError;
use crate::function::ReturnValue;
use crate::param::{InvocationRequest, convert_arguments};
use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Classification of a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// No tool with that name.
    UnknownTool,
    /// Required arguments were absent.
    MissingArgument,
    /// Undeclared arguments were supplied.
    UnknownArgument,
    /// An argument could not be converted.
    ConversionError,
    /// The function itself failed.
    ExecutionError,
}

impl FailureKind {
    /// Stable identifier used in protocol payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownTool => "UnknownTool",
            Self::MissingArgument => "MissingArgument",
            Self::UnknownArgument => "UnknownArgument",
            Self::ConversionError => "ConversionError",
            Self::ExecutionError => "ExecutionError",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationFailure {
    /// What went wrong.
    pub kind: FailureKind,
    /// Human-readable message.
    pub message: String,
}

impl InvocationFailure {
    fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ArgumentError> for InvocationFailure {
    fn from(err: ArgumentError) -> Self {
        let kind = match &err {
            ArgumentError::Missing { .. } => FailureKind::MissingArgument,
            ArgumentError::Unknown { .. } => FailureKind::UnknownArgument,
            ArgumentError::Conversion { .. } | ArgumentError::NotAnObject { .. } => {
                FailureKind::ConversionError
            }
        };
        Self::new(kind, err.to_string())
    }
}

/// Outcome of [`Dispatcher::invoke`].
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    /// The function's serialized return value.
    Success(ReturnValue),
    /// The invocation failed.
    Failure(InvocationFailure),
}

impl InvocationResult {
    /// Whether the invocation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&InvocationFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Text rendering for protocol content blocks.
    ///
    /// String results are returned bare; other values as compact JSON.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Success(ReturnValue::String(s)) => s.clone(),
            Self::Success(value) => value.to_string(),
            Self::Failure(failure) => failure.message.clone(),
        }
    }
}

/// Routes tool calls to library functions.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    catalog: Arc<Catalog>,
}

impl Dispatcher {
    /// Creates a dispatcher over `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// The catalog this dispatcher routes into.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Dispatches a request.
    #[must_use]
    pub fn dispatch(&self, request: &InvocationRequest) -> InvocationResult {
        self.invoke(&request.name, &request.arguments)
    }

    /// Converts `arguments`, calls the function and serializes its result.
    #[must_use]
    pub fn invoke(&self, tool_name: &str, arguments: &serde_json::Value) -> InvocationResult {
        let result = self.try_invoke(tool_name, arguments);
        match &result {
            Ok(_) => tracing::debug!(tool = tool_name, "tool call succeeded"),
            Err(failure) => tracing::debug!(
                tool = tool_name,
                kind = %failure.kind,
                message = %failure.message,
                "tool call failed"
            ),
        }
        match result {
            Ok(value) => InvocationResult::Success(value),
            Err(failure) => InvocationResult::Failure(failure),
        }
    }

    fn try_invoke(
        &self,
        tool_name: &str,
        arguments: &serde_json::Value,
    ) -> Result<ReturnValue, InvocationFailure> {
        let entry = self.catalog.get(tool_name).ok_or_else(|| {
            InvocationFailure::new(FailureKind::UnknownTool, format!("Unknown tool: {tool_name}"))
        })?;
        let signature = entry.record.signature().ok_or_else(|| {
            InvocationFailure::new(
                FailureKind::ExecutionError,
                format!("`{tool_name}` is not invocable"),
            )
        })?;

        let args = convert_arguments(
            signature,
            arguments,
            self.catalog.options().unknown_arguments,
        )?;

        let record = &entry.record;
        match catch_unwind(AssertUnwindSafe(|| record.invoke(args))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(InvocationFailure::new(
                FailureKind::ExecutionError,
                err.message(),
            )),
            Err(payload) => Err(InvocationFailure::new(
                FailureKind::ExecutionError,
                panic_message(payload.as_ref()),
            )),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "function panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;

    #[test]
    fn argument_errors_map_to_kinds() {
        let missing: InvocationFailure = ArgumentError::Missing {
            parameters: vec!["n".into()],
        }
        .into();
        assert_eq!(missing.kind, FailureKind::MissingArgument);

        let unknown: InvocationFailure = ArgumentError::Unknown {
            arguments: vec!["x".into()],
        }
        .into();
        assert_eq!(unknown.kind, FailureKind::UnknownArgument);

        let conversion: InvocationFailure = ArgumentError::Conversion {
            parameter: "rate".into(),
            source: ConversionError::NotFinite,
        }
        .into();
        assert_eq!(conversion.kind, FailureKind::ConversionError);
        assert!(conversion.message.contains("rate"));

        let shape: InvocationFailure = ArgumentError::NotAnObject {
            found: "array".into(),
        }
        .into();
        assert_eq!(shape.kind, FailureKind::ConversionError);
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload = catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom 1");
        let payload = catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static");
    }

    #[test]
    fn text_rendering() {
        assert_eq!(
            InvocationResult::Success(serde_json::json!("hello")).to_text(),
            "hello"
        );
        assert_eq!(
            InvocationResult::Success(serde_json::json!({"a": 1})).to_text(),
            r#"{"a":1}"#
        );
        let failure = InvocationResult::Failure(InvocationFailure::new(
            FailureKind::UnknownTool,
            "Unknown tool: x",
        ));
        assert!(!failure.is_success());
        assert_eq!(failure.to_text(), "Unknown tool: x");
    }
}
