//! In-memory workbench state: the shared counter and the note collection.
//!
//! The store itself is plain synchronous data. Callers that share it
//! between tasks wrap it in a single mutex, which gives every mutation a
//! single writer.

use crate::clock::utc_timestamp;
use crate::types::{Note, WorkbenchError, WorkbenchResult};

/// Default number of notes returned by [`Workbench::notes`].
pub const DEFAULT_NOTE_LIMIT: usize = 10;

/// Result of a counter increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Increment {
    pub previous: i64,
    pub current: i64,
}

/// Counter and note store.
#[derive(Debug, Clone)]
pub struct Workbench {
    counter: i64,
    notes: Vec<Note>,
    next_note_id: u64,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbench {
    /// Create an empty workbench with the counter at zero.
    pub fn new() -> Self {
        Self {
            counter: 0,
            notes: Vec::new(),
            next_note_id: 1,
        }
    }

    /// Current counter value.
    pub fn counter(&self) -> i64 {
        self.counter
    }

    /// Add `amount` (may be negative) to the counter.
    pub fn increment(&mut self, amount: i64) -> WorkbenchResult<Increment> {
        let previous = self.counter;
        let current = previous
            .checked_add(amount)
            .ok_or(WorkbenchError::CounterOverflow {
                current: previous,
                amount,
            })?;
        self.counter = current;
        tracing::debug!("Counter {previous} -> {current}");
        Ok(Increment { previous, current })
    }

    /// Append a note and return it.
    pub fn add_note(&mut self, content: String, tags: Vec<String>) -> WorkbenchResult<&Note> {
        if content.trim().is_empty() {
            return Err(WorkbenchError::InvalidInput(
                "note content must not be empty".to_string(),
            ));
        }

        let note = Note {
            id: self.next_note_id,
            content,
            tags,
            created_at: utc_timestamp(),
        };
        self.next_note_id += 1;
        self.notes.push(note);

        let idx = self.notes.len() - 1;
        Ok(&self.notes[idx])
    }

    /// Look up a note by id.
    pub fn note(&self, id: u64) -> WorkbenchResult<&Note> {
        self.notes
            .iter()
            .find(|n| n.id == id)
            .ok_or(WorkbenchError::NoteNotFound(id))
    }

    /// All notes in insertion order.
    pub fn all_notes(&self) -> &[Note] {
        &self.notes
    }

    /// Number of stored notes.
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// The newest `limit` notes matching any of `tags`, oldest first.
    ///
    /// An empty tag filter matches every note. A `limit` of zero returns
    /// every match.
    pub fn notes(&self, limit: usize, tags: &[String]) -> Vec<&Note> {
        let matching: Vec<&Note> = self
            .notes
            .iter()
            .filter(|n| tags.is_empty() || n.has_any_tag(tags))
            .collect();

        if limit == 0 || matching.len() <= limit {
            return matching;
        }
        matching[matching.len() - limit..].to_vec()
    }

    /// Ids of all notes, for argument completion.
    pub fn note_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.notes.iter().map(|n| n.id)
    }
}
