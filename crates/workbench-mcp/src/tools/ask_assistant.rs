//! Tool `ask_assistant`: Forward a prompt to the configured completion
//! provider.

use serde::Deserialize;
use serde_json::Value;

use crate::integrations::ChatMessage;
use crate::types::{McpError, McpResult, ToolCallResult};

use super::{Field, Schema, ToolContext, ToolSpec};

pub const NAME: &str = "ask_assistant";

#[derive(Debug, Deserialize)]
struct AskParams {
    prompt: String,
    #[serde(default)]
    system: Option<String>,
}

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: NAME,
        description: "Ask the configured AI assistant a question",
        schema: Schema::new()
            .field(Field::string("prompt", "Question for the assistant").required())
            .field(Field::string("system", "Optional system instruction")),
        required_scope: None,
    }
}

pub async fn execute(args: Value, ctx: &ToolContext<'_>) -> McpResult<ToolCallResult> {
    let params: AskParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let provider = ctx
        .server
        .completer
        .as_ref()
        .ok_or_else(|| McpError::InternalError("no completion provider configured".to_string()))?;

    tracing::debug!("Forwarding prompt to completion provider {}", provider.name());
    let reply = provider
        .complete(params.system.as_deref(), &[ChatMessage::user(params.prompt)])
        .await
        .map_err(|e| McpError::InternalError(e.to_string()))?;

    Ok(ToolCallResult::text(reply))
}
