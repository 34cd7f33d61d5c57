//! Message framing for newline-delimited JSON.

use serde_json::Value;

use crate::types::{McpError, McpResult};

/// Method whose handling must finish before the next line is read.
const BARRIER_METHOD: &str = "initialize";

/// Serialize a value to a JSON line (with trailing newline).
pub fn frame_message(value: &Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

/// Whether a frame, or any element of a batch frame, is an `initialize`.
pub fn is_barrier(frame: &Value) -> bool {
    match frame {
        Value::Array(items) => items.iter().any(is_barrier),
        Value::Object(obj) => obj.get("method").and_then(Value::as_str) == Some(BARRIER_METHOD),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_is_one_line() {
        let framed = frame_message(&json!({"a": "x\ny"})).unwrap();
        assert!(framed.ends_with('\n'));
        assert_eq!(framed.matches('\n').count(), 1);
    }

    #[test]
    fn test_barrier_detection() {
        assert!(is_barrier(&json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"})));
        assert!(is_barrier(&json!([
            {"jsonrpc": "2.0", "id": 1, "method": "ping"},
            {"jsonrpc": "2.0", "id": 2, "method": "initialize"}
        ])));
        assert!(!is_barrier(&json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})));
        assert!(!is_barrier(&json!("initialize")));
    }
}
