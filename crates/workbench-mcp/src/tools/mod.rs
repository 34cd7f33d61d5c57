//! MCP tool implementations.

pub mod add_note;
pub mod ask_assistant;
pub mod calculate;
pub mod get_current_time;
pub mod get_notes;
pub mod increment_counter;
pub mod long_running_task;
pub mod registry;
pub mod schema;

pub use registry::ToolRegistry;
pub use schema::{Field, Schema};

use crate::context::ServerContext;
use crate::integrations::Scopes;
use crate::types::{ProgressToken, ToolDefinition};

/// Static description of a tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Schema,
    /// Scope the caller must hold, if any.
    pub required_scope: Option<&'static str>,
}

impl ToolSpec {
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            input_schema: self.schema.to_json(),
        }
    }
}

/// What a tool body can see about the call it is serving.
pub struct ToolContext<'a> {
    pub server: &'a ServerContext,
    pub session_id: Option<&'a str>,
    pub scopes: &'a Scopes,
    pub progress_token: Option<ProgressToken>,
}
