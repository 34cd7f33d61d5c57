//! Resource: server://counter

use crate::context::ServerContext;
use crate::types::{McpResult, ReadResourceResult, ResourceContent};

pub async fn read_counter(uri: &str, server: &ServerContext) -> McpResult<ReadResourceResult> {
    let value = server.workbench.lock().await.counter();
    Ok(ReadResourceResult {
        contents: vec![ResourceContent::text(uri, "text/plain", value.to_string())],
    })
}
