//! Error types and JSON-RPC error codes for the MCP server.

use serde_json::{json, Value};

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// Server-specific error codes.
pub mod mcp_error_codes {
    /// Server: Unauthorized (missing or insufficient credentials).
    pub const UNAUTHORIZED: i32 = -32900;
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Handler or collaborator failure. The cause is reported in
    /// `error.data.detail` rather than the message.
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Session required")]
    SessionRequired,

    #[error("Unknown or expired session: {0}")]
    SessionNotFound(String),

    #[error("Unsupported protocol version: {requested}")]
    UnsupportedProtocolVersion {
        requested: String,
        supported: Vec<String>,
    },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unauthorized: missing credential or insufficient scope.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_)
            | McpError::SessionRequired
            | McpError::SessionNotFound(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_)
            | McpError::UnsupportedProtocolVersion { .. }
            | McpError::ResourceNotFound(_)
            | McpError::ToolNotFound(_)
            | McpError::PromptNotFound(_) => INVALID_PARAMS,
            McpError::InternalError(_)
            | McpError::Transport(_)
            | McpError::Io(_)
            | McpError::Json(_) => INTERNAL_ERROR,
            McpError::Unauthorized(_) => UNAUTHORIZED,
        }
    }

    /// Client-facing message. Internal failures keep theirs short and move
    /// the cause into [`McpError::data`].
    fn message(&self) -> String {
        match self {
            McpError::InternalError(_)
            | McpError::Transport(_)
            | McpError::Io(_)
            | McpError::Json(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }

    fn data(&self) -> Option<Value> {
        match self {
            McpError::InternalError(detail) | McpError::Transport(detail) => {
                Some(json!({ "detail": detail }))
            }
            McpError::Io(e) => Some(json!({ "detail": e.to_string() })),
            McpError::Json(e) => Some(json!({ "detail": e.to_string() })),
            McpError::UnsupportedProtocolVersion { supported, .. } => {
                Some(json!({ "supported": supported }))
            }
            _ => None,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.message(),
                data: self.data(),
            },
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;

/// Raised while building the static capability tables at startup.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("duplicate {kind} registration: {name}")]
    Duplicate { kind: &'static str, name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_are_invalid_request() {
        assert_eq!(McpError::SessionRequired.code(), error_codes::INVALID_REQUEST);
        assert_eq!(
            McpError::SessionNotFound("abc".into()).code(),
            error_codes::INVALID_REQUEST
        );
    }

    #[test]
    fn test_internal_error_moves_cause_to_data() {
        let err = McpError::InternalError("provider timed out".into())
            .to_json_rpc_error(RequestId::from(7));
        assert_eq!(err.error.code, error_codes::INTERNAL_ERROR);
        assert_eq!(err.error.message, "Internal error");
        assert_eq!(err.error.data.unwrap()["detail"], "provider timed out");
    }

    #[test]
    fn test_unsupported_version_lists_supported() {
        let err = McpError::UnsupportedProtocolVersion {
            requested: "1999-01-01".into(),
            supported: vec!["2024-11-05".into()],
        }
        .to_json_rpc_error(RequestId::Null);
        assert_eq!(err.error.code, error_codes::INVALID_PARAMS);
        assert_eq!(err.error.data.unwrap()["supported"][0], "2024-11-05");
    }
}
