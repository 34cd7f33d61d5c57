//! Core data types for notes and workbench errors.

use serde::{Deserialize, Serialize};

/// A note stored on the workbench.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
}

impl Note {
    /// True if the note carries at least one of the given tags.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.tags.contains(t))
    }
}

/// Errors raised by workbench collaborators.
///
/// These describe problems with the *input* to an otherwise healthy
/// operation. Callers surface them as tool-level failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WorkbenchError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Unsupported timezone: {0}")]
    UnsupportedTimezone(String),

    #[error("Note not found: {0}")]
    NoteNotFound(u64),

    #[error("Counter overflow: {current} + {amount}")]
    CounterOverflow { current: i64, amount: i64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience result type.
pub type WorkbenchResult<T> = Result<T, WorkbenchError>;
