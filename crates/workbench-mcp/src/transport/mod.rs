//! Transport layer for MCP communication.

pub mod framing;
#[cfg(feature = "sse")]
pub mod sse;
pub mod stdio;

#[cfg(feature = "sse")]
pub use sse::SseTransport;
pub use stdio::StdioTransport;

/// Header carrying the session id on the HTTP transport.
pub const SESSION_HEADER: &str = "x-session-id";
