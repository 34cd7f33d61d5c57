//! Argument completion for prompts and resource templates.

use crate::context::ServerContext;
use crate::prompts::{greeting, PromptRegistry};
use crate::resources::{ResourceRegistry, NOTE_TEMPLATE};
use crate::types::{CompleteParams, CompleteResult, CompletionReference, McpError, McpResult};

/// Prefix-filtered suggestions for `params.argument`.
///
/// Unknown prompts and resources are errors; a known target with no
/// completion source for the argument yields an empty list.
pub async fn complete(
    params: CompleteParams,
    prompts: &PromptRegistry,
    resources: &ResourceRegistry,
    server: &ServerContext,
) -> McpResult<CompleteResult> {
    let argument = params.argument.name.as_str();
    let prefix = params.argument.value.as_str();

    let candidates: Vec<String> = match &params.reference {
        CompletionReference::Prompt { name } => {
            if !prompts.contains(name) {
                return Err(McpError::PromptNotFound(name.clone()));
            }
            match (name.as_str(), argument) {
                (greeting::NAME, "style") => {
                    greeting::STYLES.iter().map(|s| s.to_string()).collect()
                }
                _ => Vec::new(),
            }
        }
        CompletionReference::Resource { uri } => {
            if resources.template(uri).is_none() && !resources.is_static(uri) {
                return Err(McpError::ResourceNotFound(uri.clone()));
            }
            match (uri.as_str(), argument) {
                (NOTE_TEMPLATE, "id") => {
                    let bench = server.workbench.lock().await;
                    bench.note_ids().map(|id| id.to_string()).collect()
                }
                _ => Vec::new(),
            }
        }
    };

    let values = candidates
        .into_iter()
        .filter(|c| c.starts_with(prefix))
        .collect();
    Ok(CompleteResult::from_values(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompletionArgument;

    fn params(reference: CompletionReference, name: &str, value: &str) -> CompleteParams {
        CompleteParams {
            reference,
            argument: CompletionArgument {
                name: name.to_string(),
                value: value.to_string(),
            },
        }
    }

    fn registries() -> (PromptRegistry, ResourceRegistry) {
        (
            PromptRegistry::builtin().unwrap(),
            ResourceRegistry::builtin().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_greeting_style_prefix() {
        let (prompts, resources) = registries();
        let server = ServerContext::default();
        let greeting_ref = CompletionReference::Prompt {
            name: "greeting".into(),
        };

        let all = complete(params(greeting_ref.clone(), "style", ""), &prompts, &resources, &server)
            .await
            .unwrap();
        assert_eq!(all.completion.values, vec!["formal", "casual", "enthusiastic"]);

        let f = complete(params(greeting_ref.clone(), "style", "f"), &prompts, &resources, &server)
            .await
            .unwrap();
        assert_eq!(f.completion.values, vec!["formal"]);
        assert!(!f.completion.has_more);

        let none = complete(params(greeting_ref, "name", "A"), &prompts, &resources, &server)
            .await
            .unwrap();
        assert!(none.completion.values.is_empty());
    }

    #[tokio::test]
    async fn test_note_ids() {
        let (prompts, resources) = registries();
        let server = ServerContext::default();
        {
            let mut bench = server.workbench.lock().await;
            for i in 0..12 {
                bench.add_note(format!("n{i}"), vec![]).unwrap();
            }
        }
        let note_ref = CompletionReference::Resource {
            uri: NOTE_TEMPLATE.into(),
        };
        let result = complete(params(note_ref, "id", "1"), &prompts, &resources, &server)
            .await
            .unwrap();
        assert_eq!(result.completion.values, vec!["1", "10", "11", "12"]);
        assert_eq!(result.completion.total, Some(4));
    }

    #[tokio::test]
    async fn test_unknown_prompt_is_error() {
        let (prompts, resources) = registries();
        let server = ServerContext::default();
        let result = complete(
            params(CompletionReference::Prompt { name: "nope".into() }, "x", ""),
            &prompts,
            &resources,
            &server,
        )
        .await;
        assert!(matches!(result, Err(McpError::PromptNotFound(_))));
    }
}
