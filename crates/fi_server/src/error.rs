//! Error types for the protocol runtime.

use crate::types::{JsonRpcError, error_codes};
use fi_tools::ResourceError;

/// Errors raised while serving protocol requests.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Failed to parse JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Transport I/O error.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The message is JSON but not a request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The requested method is not supported.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters for a method.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// A help resource lookup failed.
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl McpError {
    /// Convert to a JSON-RPC error object.
    #[must_use]
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let code = match self {
            Self::JsonParse(_) => error_codes::PARSE_ERROR,
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            Self::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) | Self::Resource(ResourceError::InvalidUri(_)) => {
                error_codes::INVALID_PARAMS
            }
            Self::Resource(ResourceError::NotFound(_)) => error_codes::RESOURCE_NOT_FOUND,
            Self::Transport(_) => error_codes::INTERNAL_ERROR,
        };
        JsonRpcError {
            code,
            message: self.to_string(),
            data: None,
        }
    }
}
