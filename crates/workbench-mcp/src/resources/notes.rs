//! Resources: server://notes and note://{id}

use crate::context::ServerContext;
use crate::types::{McpError, McpResult, ReadResourceResult, ResourceContent};

pub async fn read_notes(uri: &str, server: &ServerContext) -> McpResult<ReadResourceResult> {
    let text = {
        let bench = server.workbench.lock().await;
        serde_json::to_string_pretty(bench.all_notes())?
    };

    Ok(ReadResourceResult {
        contents: vec![ResourceContent::text(uri, "application/json", text)],
    })
}

pub async fn read_note(
    uri: &str,
    id: &str,
    server: &ServerContext,
) -> McpResult<ReadResourceResult> {
    let id: u64 = id
        .parse()
        .map_err(|_| McpError::InvalidParams(format!("Invalid note ID: {id}")))?;

    let text = {
        let bench = server.workbench.lock().await;
        let note = bench
            .note(id)
            .map_err(|e| McpError::InvalidParams(e.to_string()))?;
        serde_json::to_string_pretty(note)?
    };

    Ok(ReadResourceResult {
        contents: vec![ResourceContent::text(uri, "application/json", text)],
    })
}
