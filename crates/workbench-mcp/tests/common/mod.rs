//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};

use workbench_mcp::context::{ServerContext, SessionContext};
use workbench_mcp::integrations::EchoProvider;
use workbench_mcp::protocol::ProtocolHandler;

pub fn handler() -> Arc<ProtocolHandler> {
    Arc::new(ProtocolHandler::new(Arc::new(ServerContext::default())).unwrap())
}

pub fn handler_with_assistant() -> Arc<ProtocolHandler> {
    let server = ServerContext::default().with_completer(Arc::new(EchoProvider));
    Arc::new(ProtocolHandler::new(Arc::new(server)).unwrap())
}

/// Build an MCP JSON-RPC request.
pub fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

pub fn init_params() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {},
        "clientInfo": { "name": "test-client", "version": "1.0" }
    })
}

/// Build an initialize request.
pub fn init_request() -> Value {
    mcp_request(0, "initialize", init_params())
}

pub fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

/// Send a JSON-RPC message through the handler and return the response.
pub async fn send(handler: &ProtocolHandler, ctx: &SessionContext, msg: Value) -> Option<Value> {
    handler.handle_value(msg, ctx).await.body
}

/// Send and unwrap the response.
pub async fn send_unwrap(handler: &ProtocolHandler, ctx: &SessionContext, msg: Value) -> Value {
    send(handler, ctx, msg).await.expect("expected response")
}

/// Run `initialize` and return a context bound to the new session.
pub async fn open_session(handler: &ProtocolHandler) -> SessionContext {
    let reply = handler
        .handle_value(init_request(), &SessionContext::default())
        .await;
    let session_id = reply.session.expect("initialize creates a session");
    SessionContext::for_session(session_id)
}

pub fn error_code(response: &Value) -> i64 {
    response["error"]["code"]
        .as_i64()
        .unwrap_or_else(|| panic!("expected error response, got {response}"))
}

pub fn result_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("expected text content, got {response}"))
}
