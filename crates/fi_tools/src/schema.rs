//! Tool schema generation.
//!
//! Provides [`ParameterSchema`] for individual parameters and [`ToolSchema`]
//! for complete tool definitions, plus [`generate_schema`] which builds one
//! from a function record and its parsed docstring.

use crate::docstring::{ParsedDocstring, normalize_whitespace};
use crate::error::SchemaError;
use crate::function::FunctionRecord;
use crate::types::native_to_schema;
use serde::Serialize;

/// Description used when a function has no summary.
pub const NO_DOCUMENTATION: &str = "No documentation available.";

/// Schema information for a single tool parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSchema {
    /// Parameter name.
    pub name: String,
    /// JSON Schema for this parameter's type.
    pub schema: serde_json::Value,
    /// Parameter description from the docstring, or a placeholder.
    pub description: String,
    /// Whether this parameter is required.
    pub required: bool,
    /// Default value for optional parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// A tool's name, description and parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSchema {
    /// Tool name, including any prefix.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterSchema>,
    /// Whether placeholder documentation was substituted.
    pub degraded: bool,
    /// Full JSON Schema derived from `parameters`. Use [`Self::input_schema()`] to read.
    #[serde(rename = "inputSchema")]
    input_schema: serde_json::Value,
}

impl ToolSchema {
    /// Creates a schema with no parameters.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut schema = Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            degraded: false,
            input_schema: serde_json::Value::Null,
        };
        schema.rebuild_schema();
        schema
    }

    /// Adds a parameter and rebuilds the input schema.
    #[must_use]
    pub fn add_parameter(mut self, param: ParameterSchema) -> Self {
        self.parameters.push(param);
        self.rebuild_schema();
        self
    }

    /// The JSON Schema object clients validate arguments against.
    #[must_use]
    pub fn input_schema(&self) -> &serde_json::Value {
        &self.input_schema
    }

    /// Names of required parameters in declaration order.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }

    fn rebuild_schema(&mut self) {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut param_schema = param.schema.clone();
            if let Some(obj) = param_schema.as_object_mut() {
                obj.insert(
                    "description".to_string(),
                    serde_json::Value::String(param.description.clone()),
                );
                if let Some(default) = &param.default {
                    obj.insert("default".to_string(), default.clone());
                }
            }

            properties.insert(param.name.clone(), param_schema);

            if param.required {
                required.push(param.name.clone());
            }
        }

        self.input_schema = serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false
        });
    }
}

/// Settings for [`generate_schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaOptions {
    /// Prepended to every function name to form the tool name.
    pub tool_prefix: String,
}

/// Builds the tool schema for `record`.
///
/// Undocumented parameters receive the placeholder `Parameter: {name}` and an
/// empty summary becomes [`NO_DOCUMENTATION`]; either marks the schema
/// `degraded`.
///
/// # Errors
///
/// Fails when the record has no signature or a parameter type has no schema
/// representation.
pub fn generate_schema(
    record: &FunctionRecord,
    docs: &ParsedDocstring,
    options: &SchemaOptions,
) -> Result<ToolSchema, SchemaError> {
    let signature = record.signature().ok_or_else(|| SchemaError::Undescribed {
        function: record.name().to_string(),
    })?;

    let mut degraded = false;
    let description = match normalize_whitespace(&docs.summary) {
        summary if summary.is_empty() => {
            degraded = true;
            NO_DOCUMENTATION.to_string()
        }
        summary => summary,
    };

    let mut tool = ToolSchema::new(format!("{}{}", options.tool_prefix, record.name()), description);

    for param in &signature.params {
        let schema = native_to_schema(&param.ty).map_err(|err| SchemaError::UnsupportedType {
            function: record.name().to_string(),
            parameter: param.name.clone(),
            type_name: err.type_name,
        })?;

        let description = match docs.description_for(&param.name) {
            Some(description) => description.to_string(),
            None => {
                degraded = true;
                format!("Parameter: {}", param.name)
            }
        };

        tool = tool.add_parameter(ParameterSchema {
            name: param.name.clone(),
            schema,
            description,
            required: param.is_required(),
            default: param.default.as_ref().map(|d| d.to_json()),
        });
    }

    tool.degraded = degraded;
    Ok(tool)
}
