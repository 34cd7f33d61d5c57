//! Prompt `summarize_notes`: Ask for a summary of the newest notes.

use serde_json::Value;

use workbench::{Workbench, DEFAULT_NOTE_LIMIT};

use crate::types::{
    McpError, McpResult, PromptArgument, PromptDefinition, PromptGetResult, PromptMessage,
};

pub const NAME: &str = "summarize_notes";

pub fn definition() -> PromptDefinition {
    PromptDefinition {
        name: NAME.to_string(),
        description: Some("Generate a summary of stored notes".to_string()),
        arguments: Some(vec![PromptArgument {
            name: "max_notes".to_string(),
            description: Some("Maximum number of notes to include".to_string()),
            required: false,
        }]),
    }
}

/// Prompt arguments arrive as strings, but a bare number is accepted too.
fn max_notes(args: &Value) -> McpResult<usize> {
    let invalid = || {
        McpError::InvalidParams("Argument 'max_notes' must be a non-negative integer".to_string())
    };
    match args.get("max_notes") {
        None | Some(Value::Null) => Ok(DEFAULT_NOTE_LIMIT),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid()),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(invalid),
        Some(_) => Err(invalid()),
    }
}

pub fn expand(args: Value, bench: &Workbench) -> McpResult<PromptGetResult> {
    let limit = max_notes(&args)?;

    let lines: Vec<String> = bench
        .notes(limit, &[])
        .into_iter()
        .map(|n| format!("- {} (tags: {})", n.content, n.tags.join(", ")))
        .collect();
    let notes_text = if lines.is_empty() {
        "No notes available.".to_string()
    } else {
        lines.join("\n")
    };

    Ok(PromptGetResult {
        description: Some("Summary request for recent notes".to_string()),
        messages: vec![PromptMessage::user(format!(
            "Please summarize these notes:\n\n{notes_text}"
        ))],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolContent;
    use serde_json::json;

    fn text(result: &PromptGetResult) -> &str {
        match &result.messages[0].content {
            ToolContent::Text { text } => text,
        }
    }

    #[test]
    fn test_empty_store() {
        let bench = Workbench::new();
        let result = expand(json!({}), &bench).unwrap();
        assert_eq!(
            text(&result),
            "Please summarize these notes:\n\nNo notes available."
        );
    }

    #[test]
    fn test_limit_as_string() {
        let mut bench = Workbench::new();
        bench.add_note("one".into(), vec!["a".into()]).unwrap();
        bench.add_note("two".into(), vec![]).unwrap();
        let result = expand(json!({"max_notes": "1"}), &bench).unwrap();
        assert_eq!(text(&result), "Please summarize these notes:\n\n- two (tags: )");
        assert!(expand(json!({"max_notes": "x"}), &bench).is_err());
    }
}
