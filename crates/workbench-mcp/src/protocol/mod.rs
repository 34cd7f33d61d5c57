//! MCP protocol handling: JSON-RPC dispatch.

pub mod completion;
pub mod handler;
pub mod methods;
pub mod negotiation;
pub mod validator;

pub use handler::{ProtocolHandler, Reply};
pub use methods::{Category, Method};
