//! Argument conversion and validation.
//!
//! - [`InvocationRequest`] — a tool name with its raw JSON arguments
//! - [`convert_arguments`] — raw arguments to the ordered native vector a
//!   function's invoker expects

use crate::error::{ArgumentError, describe_value};
use crate::function::Signature;
use crate::types::{NativeValue, schema_value_to_native};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A tool call request with name and raw JSON arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    /// Tool name.
    pub name: String,
    /// Raw arguments; expected to be an object or `null`.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl InvocationRequest {
    /// Creates a new request.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Handling of arguments the function does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownArguments {
    /// Fail the invocation.
    #[default]
    Reject,
    /// Drop them silently.
    Ignore,
}

impl FromStr for UnknownArguments {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!("expected `reject` or `ignore`, got `{other}`")),
        }
    }
}

/// Converts raw arguments into native values in declaration order.
///
/// `null` means no arguments. Omitted optional parameters receive their
/// default, or [`NativeValue::Null`] when they have none.
///
/// # Errors
///
/// Checks run in order: payload shape, unknown keys, missing required
/// parameters (all of them named at once), then per-parameter conversion.
pub fn convert_arguments(
    signature: &Signature,
    arguments: &serde_json::Value,
    unknown: UnknownArguments,
) -> Result<Vec<NativeValue>, ArgumentError> {
    let empty = serde_json::Map::new();
    let map = match arguments {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => &empty,
        other => {
            return Err(ArgumentError::NotAnObject {
                found: describe_value(other),
            });
        }
    };

    if unknown == UnknownArguments::Reject {
        let mut extra: Vec<String> = map
            .keys()
            .filter(|key| signature.param(key).is_none())
            .cloned()
            .collect();
        if !extra.is_empty() {
            extra.sort();
            return Err(ArgumentError::Unknown { arguments: extra });
        }
    }

    let missing: Vec<String> = signature
        .params
        .iter()
        .filter(|p| p.is_required() && map.get(&p.name).is_none_or(serde_json::Value::is_null))
        .map(|p| p.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(ArgumentError::Missing {
            parameters: missing,
        });
    }

    signature
        .params
        .iter()
        .map(|param| match map.get(&param.name) {
            Some(value) if !(value.is_null() && param.default.is_some()) => {
                schema_value_to_native(value, &param.ty).map_err(|source| {
                    ArgumentError::Conversion {
                        parameter: param.name.clone(),
                        source,
                    }
                })
            }
            _ => Ok(param.default.clone().unwrap_or(NativeValue::Null)),
        })
        .collect()
}
