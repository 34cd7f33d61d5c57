//! Tool `get_current_time`: Current date and time.

use serde::Deserialize;
use serde_json::{json, Value};

use workbench::clock;

use crate::types::{McpError, McpResult, ToolCallResult};

use super::{Field, Schema, ToolContext, ToolSpec};

pub const NAME: &str = "get_current_time";

#[derive(Debug, Deserialize)]
struct TimeParams {
    #[serde(default)]
    timezone: Option<String>,
}

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: NAME,
        description: "Get the current date and time",
        schema: Schema::new().field(
            Field::string(
                "timezone",
                "UTC, Z, or a fixed offset such as +05:30",
            )
            .default(json!("UTC")),
        ),
        required_scope: None,
    }
}

pub async fn execute(args: Value, _ctx: &ToolContext<'_>) -> McpResult<ToolCallResult> {
    let params: TimeParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let timezone = params.timezone.as_deref().unwrap_or("UTC");
    match clock::format_now(timezone) {
        Ok(now) => Ok(ToolCallResult::text(format!("Current time: {now}"))),
        Err(e) => Ok(ToolCallResult::error(format!("Error: {e}"))),
    }
}
