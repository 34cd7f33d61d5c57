//! Tool `get_notes`: Newest notes, optionally filtered by tag.

use serde::Deserialize;
use serde_json::{json, Value};

use workbench::{Note, DEFAULT_NOTE_LIMIT};

use crate::types::{McpError, McpResult, ToolCallResult};

use super::{Field, Schema, ToolContext, ToolSpec};

pub const NAME: &str = "get_notes";

#[derive(Debug, Deserialize)]
struct GetNotesParams {
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: NAME,
        description: "Retrieve stored notes",
        schema: Schema::new()
            .field(
                Field::integer("limit", "Maximum number of notes (0 returns all)")
                    .at_least(0.0)
                    .default(json!(DEFAULT_NOTE_LIMIT)),
            )
            .field(Field::string_array(
                "tags",
                "Only notes carrying any of these tags",
            )),
        required_scope: None,
    }
}

pub async fn execute(args: Value, ctx: &ToolContext<'_>) -> McpResult<ToolCallResult> {
    let params: GetNotesParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let tags = params.tags.unwrap_or_default();
    let limit = params.limit.unwrap_or(DEFAULT_NOTE_LIMIT);

    let bench = ctx.server.workbench.lock().await;
    let notes: Vec<&Note> = bench.notes(limit, &tags);
    Ok(ToolCallResult::json(&notes))
}
