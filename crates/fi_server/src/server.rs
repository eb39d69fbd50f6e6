//! Protocol server.
//!
//! [`McpServer`] answers JSON-RPC requests from a [`Catalog`]: tool calls go
//! through the [`Dispatcher`], help resources through the [`ResourceProvider`].
//! Requests are handled one at a time, in arrival order.

use fi_core::ServerInfo;
use fi_tools::{Catalog, Dispatcher, InvocationResult, ResourceProvider};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::error::McpError;
use crate::transport::McpTransport;
use crate::types::*;

/// MIME type of every help resource.
const MARKDOWN: &str = "text/markdown";

/// Protocol server over a tool catalog.
pub struct McpServer {
    dispatcher: Dispatcher,
    resources: ResourceProvider,
    info: ServerInfo,
    initialized: bool,
}

impl McpServer {
    /// Create a server for `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::clone(&catalog)),
            resources: ResourceProvider::new(catalog),
            info: ServerInfo::default(),
            initialized: false,
        }
    }

    /// Whether a client has completed `initialize`.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server loop until the transport closes.
    ///
    /// # Errors
    ///
    /// Only transport failures end the loop early; malformed messages are
    /// answered with JSON-RPC errors.
    pub async fn run<T: McpTransport>(&mut self, transport: &mut T) -> Result<(), McpError> {
        tracing::info!(
            server = self.info.name,
            version = self.info.version,
            debug = self.info.debug,
            tools = self.dispatcher.catalog().len(),
            "server starting"
        );

        while let Some(line) = transport.receive().await? {
            tracing::debug!(message = %line, "received message");
            if let Some(response) = self.handle_message(&line) {
                let json = serde_json::to_string(&response)?;
                tracing::debug!(response = %json, "sending response");
                transport.send(&json).await?;
            }
        }

        tracing::info!("transport closed, shutting down");
        Ok(())
    }

    /// Handle one raw message. Notifications produce no response.
    pub fn handle_message(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse JSON");
                return Some(JsonRpcResponse::error(
                    None,
                    McpError::JsonParse(e).to_rpc_error(),
                ));
            }
        };

        if raw.get("id").is_none() {
            match serde_json::from_value::<JsonRpcNotification>(raw) {
                Ok(notification) => self.handle_notification(&notification),
                Err(e) => tracing::warn!(error = %e, "ignoring malformed notification"),
            }
            return None;
        }

        let id = raw.get("id").cloned().and_then(|id| serde_json::from_value(id).ok());
        match serde_json::from_value::<JsonRpcRequest>(raw) {
            Ok(request) => Some(self.handle_request(&request)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse JSON-RPC request");
                Some(JsonRpcResponse::error(
                    id,
                    McpError::InvalidRequest(e.to_string()).to_rpc_error(),
                ))
            }
        }
    }

    /// Handle a single JSON-RPC request and produce a response.
    pub fn handle_request(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        let params = request.params.as_ref();

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(params),
            "resources/list" => self.handle_list_resources(),
            "resources/read" => self.handle_read_resource(params),
            method => {
                tracing::warn!(method, "unknown method");
                Err(McpError::MethodNotFound(method.to_string()))
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => JsonRpcResponse::error(Some(id), err.to_rpc_error()),
        }
    }

    fn handle_notification(&mut self, notification: &JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" => tracing::info!("client confirmed initialization"),
            "notifications/cancelled" => tracing::debug!("client cancelled a request"),
            method => tracing::debug!(method, "unknown notification, ignoring"),
        }
    }

    fn handle_initialize(&mut self) -> Result<Value, McpError> {
        tracing::info!("handling initialize");
        self.initialized = true;

        to_value(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
                resources: Some(ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                }),
            },
            server_info: Implementation {
                name: self.info.name.to_string(),
                version: Some(self.info.version.to_string()),
            },
        })
    }

    fn handle_list_tools(&self) -> Result<Value, McpError> {
        tracing::debug!("handling tools/list");
        let tools = self.dispatcher.catalog().tools().map(ToolInfo::from).collect();
        to_value(ListToolsResult { tools })
    }

    fn handle_call_tool(&self, params: Option<&Value>) -> Result<Value, McpError> {
        let params = params.ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
        let call: CallToolParams = serde_json::from_value(params.clone())
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        tracing::debug!(tool = %call.name, "handling tools/call");

        let outcome = self.dispatcher.invoke(&call.name, &call.arguments);
        let mut result = CallToolResult::text(outcome.to_text());
        if let InvocationResult::Failure(failure) = &outcome {
            result.is_error = true;
            result.structured_content = Some(to_value(failure)?);
        }
        to_value(result)
    }

    fn handle_list_resources(&self) -> Result<Value, McpError> {
        tracing::debug!("handling resources/list");
        to_value(ListResourcesResult {
            resources: self.resources.list(),
        })
    }

    fn handle_read_resource(&self, params: Option<&Value>) -> Result<Value, McpError> {
        let params = params.ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
        let read: ReadResourceParams = serde_json::from_value(params.clone())
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;

        tracing::debug!(uri = %read.uri, "handling resources/read");

        let text = self.resources.read(&read.uri)?;
        to_value(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: read.uri,
                mime_type: MARKDOWN.to_string(),
                text,
            }],
        })
    }
}

fn to_value(value: impl Serialize) -> Result<Value, McpError> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fi_tools::{CatalogOptions, Library};

    fn server() -> McpServer {
        let catalog = Catalog::build(
            &fi_calc::library(),
            CatalogOptions::new(fi_calc::MODULE_NAME).with_tool_prefix("fi_"),
        )
        .unwrap();
        McpServer::new(Arc::new(catalog))
    }

    fn call(server: &mut McpServer, method: &str, params: Option<Value>) -> JsonRpcResponse {
        server.handle_request(&JsonRpcRequest::new(RpcId::Number(1), method, params))
    }

    #[test]
    fn initialize_marks_the_server_initialized() {
        let mut server = server();
        assert!(!server.is_initialized());
        let resp = call(&mut server, "initialize", Some(json!({})));
        assert!(resp.error.is_none());
        assert!(server.is_initialized());
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], json!(PROTOCOL_VERSION));
        assert_eq!(result["serverInfo"]["name"], json!("fi-mcp"));
    }

    #[test]
    fn ping_returns_empty_object() {
        let resp = call(&mut server(), "ping", None);
        assert_eq!(resp.result, Some(json!({})));
    }

    #[test]
    fn unknown_method_is_method_not_found() {
        let resp = call(&mut server(), "prompts/list", None);
        assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn call_without_params_is_invalid_params() {
        let resp = call(&mut server(), "tools/call", None);
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[test]
    fn notifications_get_no_response() {
        let mut server = server();
        let line = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(server.handle_message(line).is_none());
    }

    #[test]
    fn garbage_is_a_parse_error_with_null_id() {
        let resp = server().handle_message("{not json").unwrap();
        assert!(resp.id.is_none());
        assert_eq!(resp.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[test]
    fn request_without_method_is_invalid_request() {
        let resp = server()
            .handle_message(r#"{"jsonrpc":"2.0","id":3}"#)
            .unwrap();
        assert_eq!(resp.id, Some(RpcId::Number(3)));
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[test]
    fn empty_library_fails_before_serving() {
        let err = Catalog::build(&Library::new(), CatalogOptions::new("fi")).unwrap_err();
        assert!(err.to_string().contains("fi"));
    }
}
