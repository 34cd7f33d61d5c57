//! Prompt `greeting`: A customizable greeting.

use serde_json::Value;

use crate::types::{
    McpError, McpResult, PromptArgument, PromptDefinition, PromptGetResult, PromptMessage,
};

pub const NAME: &str = "greeting";
pub const STYLES: &[&str] = &["formal", "casual", "enthusiastic"];

pub fn definition() -> PromptDefinition {
    PromptDefinition {
        name: NAME.to_string(),
        description: Some("A customizable greeting message".to_string()),
        arguments: Some(vec![
            PromptArgument {
                name: "name".to_string(),
                description: Some("Name of the person to greet".to_string()),
                required: true,
            },
            PromptArgument {
                name: "style".to_string(),
                description: Some(
                    "Style of greeting (formal, casual, enthusiastic)".to_string(),
                ),
                required: false,
            },
        ]),
    }
}

pub fn expand(args: Value) -> McpResult<PromptGetResult> {
    let name = args
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| McpError::InvalidParams("Missing required argument 'name'".to_string()))?;

    let style = args
        .get("style")
        .and_then(|v| v.as_str())
        .unwrap_or("casual");

    let text = match style {
        "formal" => format!("Good day, {name}. How may I assist you today?"),
        "enthusiastic" => format!("Hey {name}! Great to see you! What's up?"),
        "casual" => format!("Hello, {name}! How can I help you?"),
        other => {
            return Err(McpError::InvalidParams(format!(
                "Argument 'style' must be one of: {} (got '{other}')",
                STYLES.join(", ")
            )))
        }
    };

    Ok(PromptGetResult {
        description: Some(format!("A {style} greeting for {name}")),
        messages: vec![PromptMessage::user(text)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(result: &PromptGetResult) -> &str {
        match &result.messages[0].content {
            crate::types::ToolContent::Text { text } => text,
        }
    }

    #[test]
    fn test_styles() {
        let formal = expand(json!({"name": "Alice", "style": "formal"})).unwrap();
        assert_eq!(text(&formal), "Good day, Alice. How may I assist you today?");
        let casual = expand(json!({"name": "Bob"})).unwrap();
        assert_eq!(text(&casual), "Hello, Bob! How can I help you?");
    }

    #[test]
    fn test_missing_name_and_bad_style() {
        assert!(matches!(expand(json!({})), Err(McpError::InvalidParams(_))));
        assert!(matches!(
            expand(json!({"name": "A", "style": "grumpy"})),
            Err(McpError::InvalidParams(_))
        ));
    }
}
