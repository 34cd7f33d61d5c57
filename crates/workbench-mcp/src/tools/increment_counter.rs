//! Tool `increment_counter`: Add to the shared counter.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::integrations::auth::SCOPE_WRITE;
use crate::resources::COUNTER_URI;
use crate::types::{McpError, McpResult, ToolCallResult};

use super::{Field, Schema, ToolContext, ToolSpec};

pub const NAME: &str = "increment_counter";

#[derive(Debug, Deserialize)]
struct IncrementParams {
    #[serde(default)]
    amount: Option<i64>,
}

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: NAME,
        description: "Increment the shared counter",
        schema: Schema::new().field(
            Field::integer("amount", "Amount to add (may be negative)").default(json!(1)),
        ),
        required_scope: Some(SCOPE_WRITE),
    }
}

pub async fn execute(args: Value, ctx: &ToolContext<'_>) -> McpResult<ToolCallResult> {
    let params: IncrementParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let outcome = {
        let mut bench = ctx.server.workbench.lock().await;
        bench.increment(params.amount.unwrap_or(1))
    };

    match outcome {
        Ok(inc) => {
            ctx.server.bus.resource_updated(COUNTER_URI);
            Ok(ToolCallResult::text(format!(
                "Counter incremented from {} to {}",
                inc.previous, inc.current
            )))
        }
        Err(e) => Ok(ToolCallResult::error(format!("Error: {e}"))),
    }
}
