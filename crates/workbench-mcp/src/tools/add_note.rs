//! Tool `add_note`: Store a tagged note.

use serde::Deserialize;
use serde_json::Value;

use crate::integrations::auth::SCOPE_WRITE;
use crate::resources::{note_uri, NOTES_URI};
use crate::types::{McpError, McpResult, ToolCallResult};

use super::{Field, Schema, ToolContext, ToolSpec};

pub const NAME: &str = "add_note";

#[derive(Debug, Deserialize)]
struct AddNoteParams {
    content: String,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: NAME,
        description: "Add a note to the note store",
        schema: Schema::new()
            .field(Field::string("content", "Note content").required())
            .field(Field::string_array("tags", "Optional tags")),
        required_scope: Some(SCOPE_WRITE),
    }
}

pub async fn execute(args: Value, ctx: &ToolContext<'_>) -> McpResult<ToolCallResult> {
    let params: AddNoteParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let added = {
        let mut bench = ctx.server.workbench.lock().await;
        bench
            .add_note(params.content, params.tags.unwrap_or_default())
            .map(|note| note.id)
    };

    match added {
        Ok(id) => {
            ctx.server.bus.resource_updated(NOTES_URI);
            ctx.server.bus.resource_updated(&note_uri(id));
            Ok(ToolCallResult::text(format!("Note added with ID: {id}")))
        }
        Err(e) => Ok(ToolCallResult::error(format!("Error: {e}"))),
    }
}
