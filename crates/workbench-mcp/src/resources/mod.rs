//! MCP resource implementations.

pub mod counter;
pub mod notes;
pub mod registry;
pub mod status;
pub mod templates;

pub use registry::ResourceRegistry;
pub use templates::UriTemplate;

pub const STATUS_URI: &str = "server://status";
pub const NOTES_URI: &str = "server://notes";
pub const COUNTER_URI: &str = "server://counter";
pub const NOTE_TEMPLATE: &str = "note://{id}";

/// Concrete `note://{id}` URI for one note.
pub fn note_uri(id: u64) -> String {
    format!("note://{id}")
}
