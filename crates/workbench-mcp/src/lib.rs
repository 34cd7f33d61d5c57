//! Workbench MCP Server: tools, resources and prompts over the Model Context Protocol.

pub mod config;
pub mod context;
pub mod integrations;
pub mod notify;
pub mod prompts;
pub mod protocol;
pub mod repl;
pub mod resources;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::ServerConfig;
pub use context::{ServerContext, SessionContext};
pub use protocol::ProtocolHandler;
pub use transport::StdioTransport;
