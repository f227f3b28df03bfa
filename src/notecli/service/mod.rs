//! # Remote Note Service
//!
//! The service owns the authoritative note and notebook state. Everything the
//! client needs from it goes through the [`NoteService`] trait:
//!
//! - notes by GUID: `get_note`, `create_note`, `update_note`, `delete_note`
//!   (delete moves the note to the trash)
//! - `search` with a [`NoteFilter`], offset and count, most recently updated
//!   first
//! - notebooks: `list_notebooks`, `create_notebook`, `update_notebook`
//!
//! ## Implementations
//!
//! - [`fs::FileService`]: one directory per account, one JSON file per note.
//!   Used by the binary.
//! - [`memory::InMemoryService`]: test double that can be switched offline to
//!   simulate network failures.

use crate::error::Result;
use crate::model::{Guid, Note, NoteSummary, Notebook};
use chrono::{DateTime, Duration, Utc};

pub mod fs;
pub mod memory;

/// Which notes a search returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    /// Case-insensitive text every matching note contains in its title or content.
    pub words: Option<String>,
    pub notebook: Option<Guid>,
}

impl NoteFilter {
    pub fn words(mut self, words: impl Into<String>) -> Self {
        self.words = Some(words.into());
        self
    }

    pub fn notebook(mut self, notebook: Option<Guid>) -> Self {
        self.notebook = notebook;
        self
    }

    pub(crate) fn matches(&self, note: &Note) -> bool {
        if let Some(notebook) = &self.notebook {
            if note.notebook.as_ref() != Some(notebook) {
                return false;
            }
        }
        match &self.words {
            Some(words) => {
                let needle = words.to_lowercase();
                note.title.to_lowercase().contains(&needle)
                    || note.content.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

pub trait NoteService {
    fn get_note(&self, guid: &Guid) -> Result<Note>;

    /// Stores a new note and returns it with its assigned GUID and timestamps.
    fn create_note(&mut self, note: &Note) -> Result<Note>;

    fn update_note(&mut self, guid: &Guid, note: &Note) -> Result<Note>;

    /// Moves the note to the trash.
    fn delete_note(&mut self, guid: &Guid) -> Result<()>;

    fn search(&self, filter: &NoteFilter, offset: usize, count: usize) -> Result<Vec<NoteSummary>>;

    fn list_notebooks(&self) -> Result<Vec<Notebook>>;

    /// Creates a notebook. With `make_default` it replaces the current default.
    fn create_notebook(&mut self, notebook: &Notebook, make_default: bool) -> Result<Notebook>;

    fn update_notebook(&mut self, guid: &Guid, notebook: &Notebook) -> Result<Notebook>;
}

/// Newest first, then offset/count.
pub(crate) fn page(mut notes: Vec<NoteSummary>, offset: usize, count: usize) -> Vec<NoteSummary> {
    notes.sort_by(|a, b| b.updated.cmp(&a.updated).then_with(|| a.title.cmp(&b.title)));
    notes.into_iter().skip(offset).take(count).collect()
}

/// `now`, or just after `last` if the clock has not moved past it, so every
/// write gets a distinct, increasing timestamp.
pub(crate) fn next_timestamp(last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match last {
        Some(last) if last >= now => last + Duration::milliseconds(1),
        _ => now,
    }
}

pub(crate) fn summarize(note: &Note, guid: &Guid) -> NoteSummary {
    NoteSummary {
        guid: guid.clone(),
        title: note.title.clone(),
        notebook: note.notebook.clone(),
        updated: note.updated.or(note.created).unwrap_or_default(),
    }
}
