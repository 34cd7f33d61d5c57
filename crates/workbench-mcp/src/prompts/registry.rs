//! Prompt registration and dispatch.

use std::collections::HashSet;

use serde_json::Value;

use crate::context::ServerContext;
use crate::types::{McpError, McpResult, PromptDefinition, PromptGetResult, RegistrationError};

use super::{greeting, summarize_notes};

pub struct PromptRegistry {
    prompts: Vec<PromptDefinition>,
}

impl PromptRegistry {
    pub fn new(prompts: Vec<PromptDefinition>) -> Result<Self, RegistrationError> {
        let mut seen = HashSet::new();
        for p in &prompts {
            if !seen.insert(p.name.as_str()) {
                return Err(RegistrationError::Duplicate {
                    kind: "prompt",
                    name: p.name.clone(),
                });
            }
        }
        Ok(Self { prompts })
    }

    pub fn builtin() -> Result<Self, RegistrationError> {
        Self::new(vec![greeting::definition(), summarize_notes::definition()])
    }

    pub fn list_prompts(&self) -> Vec<PromptDefinition> {
        self.prompts.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prompts.iter().any(|p| p.name == name)
    }

    pub async fn get(
        &self,
        name: &str,
        arguments: Option<Value>,
        server: &ServerContext,
    ) -> McpResult<PromptGetResult> {
        if !self.contains(name) {
            return Err(McpError::PromptNotFound(name.to_string()));
        }
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            greeting::NAME => greeting::expand(args),
            summarize_notes::NAME => {
                let bench = server.workbench.lock().await;
                summarize_notes::expand(args, &bench)
            }
            _ => Err(McpError::PromptNotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_prompt() {
        let registry = PromptRegistry::builtin().unwrap();
        let server = ServerContext::default();
        assert!(matches!(
            registry.get("nope", None, &server).await,
            Err(McpError::PromptNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        assert!(PromptRegistry::new(vec![greeting::definition(), greeting::definition()]).is_err());
    }
}
