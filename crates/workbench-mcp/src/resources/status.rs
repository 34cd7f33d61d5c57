//! Resource: server://status

use serde_json::json;

use workbench::clock;

use crate::context::ServerContext;
use crate::types::{McpResult, ReadResourceResult, ResourceContent, MCP_VERSION, SERVER_VERSION};

pub async fn read_status(uri: &str, server: &ServerContext) -> McpResult<ReadResourceResult> {
    let (note_count, counter) = {
        let bench = server.workbench.lock().await;
        (bench.note_count(), bench.counter())
    };

    let status = json!({
        "status": "healthy",
        "server": server.config.name,
        "version": SERVER_VERSION,
        "protocol_version": MCP_VERSION,
        "active_sessions": server.sessions.len(),
        "notes_count": note_count,
        "counter": counter,
        "timestamp": clock::utc_timestamp(),
    });

    Ok(ReadResourceResult {
        contents: vec![ResourceContent::text(
            uri,
            "application/json",
            serde_json::to_string_pretty(&status)?,
        )],
    })
}
