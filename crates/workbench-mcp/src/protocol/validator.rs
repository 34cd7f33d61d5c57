//! JSON-RPC envelope validation.
//!
//! Classifies a parsed JSON value as a request, notification or client
//! response. On failure the error carries the id to reply with: the
//! message's own id when that id is itself well-formed, otherwise `null`.

use serde_json::Value;

use crate::types::{
    JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, McpError, RequestId, JSONRPC_VERSION,
};

pub type Rejection = (RequestId, McpError);

fn invalid(id: RequestId, message: impl Into<String>) -> Rejection {
    (id, McpError::InvalidRequest(message.into()))
}

/// Validate one envelope.
pub fn classify(value: Value) -> Result<JsonRpcMessage, Rejection> {
    let Value::Object(mut obj) = value else {
        return Err(invalid(RequestId::Null, "Message must be a JSON object"));
    };

    let id = match obj.get("id") {
        None => None,
        Some(raw) => Some(RequestId::from_value(raw).ok_or_else(|| {
            invalid(RequestId::Null, "Request id must be a string, number or null")
        })?),
    };
    let reply_id = id.clone().unwrap_or(RequestId::Null);

    match obj.get("jsonrpc").and_then(Value::as_str) {
        Some(JSONRPC_VERSION) => {}
        Some(other) => {
            return Err(invalid(
                reply_id,
                format!("Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{other}\""),
            ))
        }
        None => return Err(invalid(reply_id, "Missing jsonrpc version")),
    }

    if !obj.contains_key("method") && (obj.contains_key("result") || obj.contains_key("error")) {
        return Ok(JsonRpcMessage::Response(Value::Object(obj)));
    }

    let method = match obj.remove("method") {
        Some(Value::String(m)) if !m.is_empty() => m,
        Some(Value::String(_)) => {
            return Err(invalid(reply_id, "Method name must not be empty"))
        }
        Some(_) => return Err(invalid(reply_id, "Method must be a string")),
        None => return Err(invalid(reply_id, "Missing method")),
    };

    let params = match obj.remove("params") {
        None | Some(Value::Null) => None,
        Some(p @ (Value::Object(_) | Value::Array(_))) => Some(p),
        Some(_) => {
            return Err(invalid(reply_id, "Params must be an object or an array"))
        }
    };

    let jsonrpc = JSONRPC_VERSION.to_string();
    Ok(match id {
        Some(id) => JsonRpcMessage::Request(JsonRpcRequest {
            jsonrpc,
            id,
            method,
            params,
        }),
        None => JsonRpcMessage::Notification(JsonRpcNotification {
            jsonrpc,
            method,
            params,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rejected_id(value: Value) -> RequestId {
        match classify(value) {
            Err((id, McpError::InvalidRequest(_))) => id,
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_request_and_notification() {
        let req = classify(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"})).unwrap();
        assert!(matches!(req, JsonRpcMessage::Request(r) if r.id == RequestId::from(1)));

        let note = classify(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .unwrap();
        assert!(matches!(note, JsonRpcMessage::Notification(_)));
    }

    #[test]
    fn test_explicit_null_id_is_a_request() {
        let msg = classify(json!({"jsonrpc": "2.0", "id": null, "method": "ping"})).unwrap();
        assert!(matches!(msg, JsonRpcMessage::Request(r) if r.id == RequestId::Null));
    }

    #[test]
    fn test_rejections_echo_valid_id() {
        assert_eq!(
            rejected_id(json!({"jsonrpc": "1.0", "id": "a", "method": "ping"})),
            RequestId::from("a")
        );
        assert_eq!(
            rejected_id(json!({"jsonrpc": "2.0", "id": 7, "method": ""})),
            RequestId::from(7)
        );
        assert_eq!(
            rejected_id(json!({"jsonrpc": "2.0", "id": 8, "method": 5})),
            RequestId::from(8)
        );
        assert_eq!(
            rejected_id(json!({"jsonrpc": "2.0", "id": 9, "method": "ping", "params": 3})),
            RequestId::from(9)
        );
    }

    #[test]
    fn test_rejections_with_null_id() {
        assert_eq!(rejected_id(json!([1, 2])), RequestId::Null);
        assert_eq!(rejected_id(json!("hello")), RequestId::Null);
        assert_eq!(
            rejected_id(json!({"jsonrpc": "2.0", "id": {"x": 1}, "method": "ping"})),
            RequestId::Null
        );
    }

    #[test]
    fn test_client_response_is_recognised() {
        let msg = classify(json!({"jsonrpc": "2.0", "id": 3, "result": {}})).unwrap();
        assert!(matches!(msg, JsonRpcMessage::Response(_)));
    }

    #[test]
    fn test_fractional_id_preserved() {
        let msg = classify(json!({"jsonrpc": "2.0", "id": 1.5, "method": "ping"})).unwrap();
        match msg {
            JsonRpcMessage::Request(r) => {
                assert_eq!(serde_json::to_value(&r.id).unwrap(), json!(1.5))
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
