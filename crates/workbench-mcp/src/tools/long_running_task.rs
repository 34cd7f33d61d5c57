//! Tool `long_running_task`: Sleeps through a number of steps, reporting
//! progress when the caller supplied a progress token.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::types::{JsonRpcNotification, McpError, McpResult, ProgressParams, ToolCallResult};

use super::{Field, Schema, ToolContext, ToolSpec};

pub const NAME: &str = "long_running_task";

const DEFAULT_STEPS: u32 = 5;
const DEFAULT_DELAY_SECS: f64 = 0.5;

#[derive(Debug, Deserialize)]
struct TaskParams {
    #[serde(default)]
    steps: Option<u32>,
    #[serde(default)]
    delay: Option<f64>,
}

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: NAME,
        description: "Simulate a long-running task with progress notifications",
        schema: Schema::new()
            .field(
                Field::integer("steps", "Number of steps")
                    .range(1.0, 100.0)
                    .default(json!(DEFAULT_STEPS)),
            )
            .field(
                Field::number("delay", "Delay between steps in seconds")
                    .range(0.0, 10.0)
                    .default(json!(DEFAULT_DELAY_SECS)),
            ),
        required_scope: None,
    }
}

pub async fn execute(args: Value, ctx: &ToolContext<'_>) -> McpResult<ToolCallResult> {
    let params: TaskParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let steps = params.steps.unwrap_or(DEFAULT_STEPS);
    let delay = Duration::from_secs_f64(params.delay.unwrap_or(DEFAULT_DELAY_SECS));

    for step in 1..=steps {
        tokio::time::sleep(delay).await;

        if let (Some(token), Some(session_id)) = (&ctx.progress_token, ctx.session_id) {
            let progress = ProgressParams {
                progress_token: token.clone(),
                progress: f64::from(step),
                total: Some(f64::from(steps)),
                message: Some(format!("Step {step} completed")),
            };
            ctx.server
                .bus
                .push_progress(session_id, JsonRpcNotification::progress(&progress));
        }
    }

    Ok(ToolCallResult::text(format!(
        "Long-running task completed: {steps} steps"
    )))
}
