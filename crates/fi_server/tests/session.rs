//! Full protocol sessions over an in-memory transport.

use fi_server::{
    CallToolResult, ChannelTransport, JsonRpcRequest, JsonRpcResponse, McpServer, McpTransport,
    PROTOCOL_VERSION, RpcId, error_codes,
};
use fi_tools::{Catalog, CatalogOptions};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::task::JoinHandle;

struct Client {
    transport: ChannelTransport,
    next_id: i64,
}

impl Client {
    async fn request(&mut self, method: &str, params: Option<Value>) -> JsonRpcResponse {
        self.next_id += 1;
        let request = JsonRpcRequest::new(RpcId::Number(self.next_id), method, params);
        self.send_raw(&serde_json::to_string(&request).unwrap()).await;
        let response = self.receive().await;
        assert_eq!(response.id, Some(RpcId::Number(self.next_id)));
        response
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> CallToolResult {
        let response = self
            .request("tools/call", Some(json!({"name": name, "arguments": arguments})))
            .await;
        serde_json::from_value(response.result.expect("tools/call always succeeds")).unwrap()
    }

    async fn send_raw(&mut self, line: &str) {
        self.transport.send(line).await.unwrap();
    }

    async fn receive(&mut self) -> JsonRpcResponse {
        let line = self.transport.receive().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }
}

fn start(prefix: &str) -> (Client, JoinHandle<()>) {
    let options = CatalogOptions::new(fi_calc::MODULE_NAME).with_tool_prefix(prefix);
    let catalog = Arc::new(Catalog::build(&fi_calc::library(), options).unwrap());
    let (client_side, mut server_side) = ChannelTransport::pair();
    let handle = tokio::spawn(async move {
        McpServer::new(catalog).run(&mut server_side).await.unwrap();
    });
    (
        Client {
            transport: client_side,
            next_id: 0,
        },
        handle,
    )
}

// ─────────────────────────────────────────────────────────────────────
// 1. Handshake
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn initialize_then_notification_then_ping() {
    let (mut client, handle) = start("fi_");

    let init = client
        .request(
            "initialize",
            Some(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "test"}
            })),
        )
        .await;
    let result = init.result.unwrap();
    assert_eq!(result["protocolVersion"], json!(PROTOCOL_VERSION));
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["resources"].is_object());

    // Notifications are not answered; the next frame is the ping response.
    client
        .send_raw(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await;
    let ping = client.request("ping", None).await;
    assert_eq!(ping.result, Some(json!({})));

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn malformed_frames_do_not_stop_the_server() {
    let (mut client, handle) = start("");

    client.send_raw("this is not json").await;
    let response = client.receive().await;
    assert_eq!(response.id, None);
    assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);

    let ping = client.request("ping", None).await;
    assert!(ping.error.is_none());

    drop(client);
    handle.await.unwrap();
}

// ─────────────────────────────────────────────────────────────────────
// 2. Tools
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn tools_list_carries_input_schemas() {
    let (mut client, handle) = start("fi_");

    let result = client.request("tools/list", None).await.result.unwrap();
    let tools = result["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 13);

    let fi_number = tools
        .iter()
        .find(|tool| tool["name"] == json!("fi_fi_number"))
        .unwrap();
    assert_eq!(fi_number["inputSchema"]["type"], json!("object"));
    assert_eq!(fi_number["inputSchema"]["required"], json!(["annual_spending"]));
    assert!(fi_number["description"].as_str().unwrap().len() > 10);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn successful_call_returns_text() {
    let (mut client, handle) = start("fi_");

    let result = client
        .call_tool("fi_fi_number", json!({"annual_spending": 40000}))
        .await;
    assert!(!result.is_error);
    assert!(result.structured_content.is_none());
    let value: f64 = result.first_text().unwrap().parse().unwrap();
    assert!((value - 1_000_000.0).abs() < 1e-6);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn failures_are_tool_errors_not_protocol_errors() {
    let (mut client, handle) = start("fi_");

    let unknown = client.call_tool("fi_missing", json!({})).await;
    assert!(unknown.is_error);
    assert_eq!(unknown.first_text(), Some("Unknown tool: fi_missing"));
    assert_eq!(
        unknown.structured_content,
        Some(json!({"kind": "UnknownTool", "message": "Unknown tool: fi_missing"}))
    );

    let missing = client.call_tool("fi_fi_number", json!({})).await;
    assert!(missing.is_error);
    assert_eq!(
        missing.structured_content.unwrap()["kind"],
        json!("MissingArgument")
    );

    let extra = client
        .call_tool("fi_fi_number", json!({"annual_spending": 1, "bogus": 2}))
        .await;
    assert_eq!(extra.structured_content.unwrap()["kind"], json!("UnknownArgument"));

    let bad = client
        .call_tool("fi_fi_number", json!({"annual_spending": "lots"}))
        .await;
    assert_eq!(bad.structured_content.unwrap()["kind"], json!("ConversionError"));

    drop(client);
    handle.await.unwrap();
}

// ─────────────────────────────────────────────────────────────────────
// 3. Resources
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resources_list_ends_with_the_combined_entry() {
    let (mut client, handle) = start("");

    let result = client.request("resources/list", None).await.result.unwrap();
    let resources = result["resources"].as_array().unwrap();
    let last = resources.last().unwrap();
    assert_eq!(last["uri"], json!("fi://help/all"));
    assert_eq!(last["mimeType"], json!("text/markdown"));
    assert!(
        resources
            .iter()
            .any(|r| r["uri"] == json!("fi://help/coast_fi_number"))
    );

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn resources_read_serves_help_and_maps_errors() {
    let (mut client, handle) = start("");

    let result = client
        .request("resources/read", Some(json!({"uri": "fi://help/fi_number"})))
        .await
        .result
        .unwrap();
    let contents = &result["contents"][0];
    assert_eq!(contents["uri"], json!("fi://help/fi_number"));
    assert!(contents["text"].as_str().unwrap().starts_with("# FI Number\n\n"));

    let missing = client
        .request("resources/read", Some(json!({"uri": "fi://help/nope"})))
        .await;
    assert_eq!(missing.error.unwrap().code, error_codes::RESOURCE_NOT_FOUND);

    let invalid = client
        .request("resources/read", Some(json!({"uri": "https://example.com"})))
        .await;
    assert_eq!(invalid.error.unwrap().code, error_codes::INVALID_PARAMS);

    drop(client);
    handle.await.unwrap();
}
