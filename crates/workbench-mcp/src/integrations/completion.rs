//! Text-completion collaborator used by the `ask_assistant` tool.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::Role;

/// One turn of a conversation sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("completion provider failed: {0}")]
pub struct CompletionError(pub String);

/// Produces assistant text for a conversation.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    async fn complete(
        &self,
        system: Option<&str>,
        conversation: &[ChatMessage],
    ) -> Result<String, CompletionError>;
}

/// Replies with the last user message. Used by the REPL and tests.
pub struct EchoProvider;

#[async_trait]
impl CompletionProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(
        &self,
        _system: Option<&str>,
        conversation: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        conversation
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .ok_or_else(|| CompletionError("conversation has no user message".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_returns_last_user_turn() {
        let convo = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("second"),
        ];
        assert_eq!(EchoProvider.complete(None, &convo).await.unwrap(), "second");
        assert!(EchoProvider.complete(None, &[]).await.is_err());
    }
}
