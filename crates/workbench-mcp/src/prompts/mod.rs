//! MCP prompt implementations.

pub mod greeting;
pub mod registry;
pub mod summarize_notes;

pub use registry::PromptRegistry;
