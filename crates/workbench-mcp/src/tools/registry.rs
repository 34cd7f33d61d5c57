//! Tool registration and dispatch.

use std::collections::HashMap;

use serde_json::Value;

use crate::types::{McpError, McpResult, RegistrationError, ToolCallResult, ToolDefinition};

use super::{
    add_note, ask_assistant, calculate, get_current_time, get_notes, increment_counter,
    long_running_task, ToolContext, ToolSpec,
};

pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn new(tools: Vec<ToolSpec>) -> Result<Self, RegistrationError> {
        let mut index = HashMap::with_capacity(tools.len());
        for (i, tool) in tools.iter().enumerate() {
            if index.insert(tool.name, i).is_some() {
                return Err(RegistrationError::Duplicate {
                    kind: "tool",
                    name: tool.name.to_string(),
                });
            }
        }
        Ok(Self { tools, index })
    }

    /// The built-in catalog. `ask_assistant` is only offered when a
    /// completion provider is configured.
    pub fn builtin(with_assistant: bool) -> Result<Self, RegistrationError> {
        let mut tools = vec![
            get_current_time::spec(),
            increment_counter::spec(),
            add_note::spec(),
            get_notes::spec(),
            calculate::spec(),
            long_running_task::spec(),
        ];
        if with_assistant {
            tools.push(ask_assistant::spec());
        }
        Self::new(tools)
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(ToolSpec::definition).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Check scope, validate arguments against the schema, then run the tool.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
        ctx: &ToolContext<'_>,
    ) -> McpResult<ToolCallResult> {
        let spec = self
            .get(name)
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        if let Some(scope) = spec.required_scope {
            if !ctx.scopes.allows(scope) {
                return Err(McpError::Unauthorized(format!(
                    "tool '{name}' requires scope '{scope}'"
                )));
            }
        }

        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));
        spec.schema.validate(&args)?;

        match name {
            get_current_time::NAME => get_current_time::execute(args, ctx).await,
            increment_counter::NAME => increment_counter::execute(args, ctx).await,
            add_note::NAME => add_note::execute(args, ctx).await,
            get_notes::NAME => get_notes::execute(args, ctx).await,
            calculate::NAME => calculate::execute(args, ctx).await,
            long_running_task::NAME => long_running_task::execute(args, ctx).await,
            ask_assistant::NAME => ask_assistant::execute(args, ctx).await,
            _ => Err(McpError::ToolNotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let registry = ToolRegistry::builtin(false).unwrap();
        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "get_current_time",
                "increment_counter",
                "add_note",
                "get_notes",
                "calculate",
                "long_running_task"
            ]
        );
        assert!(ToolRegistry::builtin(true)
            .unwrap()
            .get(ask_assistant::NAME)
            .is_some());
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = ToolRegistry::new(vec![calculate::spec(), calculate::spec()])
            .err()
            .unwrap();
        assert_eq!(
            err,
            RegistrationError::Duplicate {
                kind: "tool",
                name: "calculate".into()
            }
        );
    }

    #[test]
    fn test_write_tools_require_scope() {
        let registry = ToolRegistry::builtin(false).unwrap();
        assert_eq!(registry.get("add_note").unwrap().required_scope, Some("write"));
        assert_eq!(registry.get("calculate").unwrap().required_scope, None);
    }
}
