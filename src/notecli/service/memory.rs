use super::{next_timestamp, page, summarize, NoteFilter, NoteService};
use crate::error::{NoteError, Result};
use crate::model::{Guid, Note, NoteSummary, Notebook};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Non-persistent service for tests.
///
/// `set_offline(true)` makes every call fail with `RemoteUnavailable`;
/// `set_read_only(true)` fails only the mutating calls.
#[derive(Debug)]
pub struct InMemoryService {
    notes: HashMap<Guid, Note>,
    trashed: Vec<Guid>,
    notebooks: Vec<Notebook>,
    offline: bool,
    read_only: bool,
    last_write: Option<DateTime<Utc>>,
}

impl Default for InMemoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryService {
    /// A service with a single default notebook named "Notes".
    pub fn new() -> Self {
        let mut default = Notebook::new("Notes");
        default.guid = Some(Guid::new());
        default.is_default = true;
        Self {
            notes: HashMap::new(),
            trashed: Vec::new(),
            notebooks: vec![default],
            offline: false,
            read_only: false,
            last_write: None,
        }
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_trashed(&self, guid: &Guid) -> bool {
        self.trashed.contains(guid)
    }

    /// Number of notes not in the trash.
    pub fn note_count(&self) -> usize {
        self.notes.len() - self.trashed.len()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            return Err(NoteError::RemoteUnavailable("service is offline".into()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        self.check_online()?;
        if self.read_only {
            return Err(NoteError::RemoteUnavailable("service rejected the write".into()));
        }
        Ok(())
    }

    fn tick(&mut self) -> DateTime<Utc> {
        let now = next_timestamp(self.last_write);
        self.last_write = Some(now);
        now
    }

    fn default_notebook(&self) -> Option<Guid> {
        self.notebooks
            .iter()
            .find(|nb| nb.is_default)
            .and_then(|nb| nb.guid.clone())
    }

    fn check_notebook(&self, notebook: &Option<Guid>) -> Result<Option<Guid>> {
        match notebook {
            Some(guid) if self.notebooks.iter().any(|nb| nb.guid.as_ref() == Some(guid)) => {
                Ok(Some(guid.clone()))
            }
            Some(guid) => Err(NoteError::NotFound(format!("notebook {}", guid))),
            None => Ok(self.default_notebook()),
        }
    }
}

impl NoteService for InMemoryService {
    fn get_note(&self, guid: &Guid) -> Result<Note> {
        self.check_online()?;
        if self.is_trashed(guid) {
            return Err(NoteError::NotFound(format!("note {}", guid)));
        }
        self.notes
            .get(guid)
            .cloned()
            .ok_or_else(|| NoteError::NotFound(format!("note {}", guid)))
    }

    fn create_note(&mut self, note: &Note) -> Result<Note> {
        self.check_writable()?;
        let notebook = self.check_notebook(&note.notebook)?;
        let now = self.tick();
        let guid = Guid::new();
        let stored = Note {
            guid: Some(guid.clone()),
            notebook,
            created: Some(now),
            updated: Some(now),
            ..note.clone()
        };
        self.notes.insert(guid, stored.clone());
        Ok(stored)
    }

    fn update_note(&mut self, guid: &Guid, note: &Note) -> Result<Note> {
        self.check_writable()?;
        let existing = self.get_note(guid)?;
        let notebook = match note.notebook {
            Some(_) => self.check_notebook(&note.notebook)?,
            None => existing.notebook.clone(),
        };
        let now = self.tick();
        let stored = Note {
            guid: Some(guid.clone()),
            notebook,
            created: existing.created,
            updated: Some(now),
            ..note.clone()
        };
        self.notes.insert(guid.clone(), stored.clone());
        Ok(stored)
    }

    fn delete_note(&mut self, guid: &Guid) -> Result<()> {
        self.check_writable()?;
        self.get_note(guid)?;
        self.trashed.push(guid.clone());
        Ok(())
    }

    fn search(&self, filter: &NoteFilter, offset: usize, count: usize) -> Result<Vec<NoteSummary>> {
        self.check_online()?;
        let hits = self
            .notes
            .iter()
            .filter(|(guid, _)| !self.is_trashed(guid))
            .filter(|(_, note)| filter.matches(note))
            .map(|(guid, note)| summarize(note, guid))
            .collect();
        Ok(page(hits, offset, count))
    }

    fn list_notebooks(&self) -> Result<Vec<Notebook>> {
        self.check_online()?;
        Ok(self.notebooks.clone())
    }

    fn create_notebook(&mut self, notebook: &Notebook, make_default: bool) -> Result<Notebook> {
        self.check_writable()?;
        if self.notebooks.iter().any(|nb| nb.name == notebook.name) {
            return Err(NoteError::DuplicateName(notebook.name.clone()));
        }
        if make_default {
            for nb in &mut self.notebooks {
                nb.is_default = false;
            }
        }
        let stored = Notebook {
            guid: Some(Guid::new()),
            is_default: make_default,
            ..notebook.clone()
        };
        self.notebooks.push(stored.clone());
        Ok(stored)
    }

    fn update_notebook(&mut self, guid: &Guid, notebook: &Notebook) -> Result<Notebook> {
        self.check_writable()?;
        if self
            .notebooks
            .iter()
            .any(|nb| nb.name == notebook.name && nb.guid.as_ref() != Some(guid))
        {
            return Err(NoteError::DuplicateName(notebook.name.clone()));
        }
        let existing = self
            .notebooks
            .iter_mut()
            .find(|nb| nb.guid.as_ref() == Some(guid))
            .ok_or_else(|| NoteError::NotFound(format!("notebook {}", guid)))?;
        existing.name = notebook.name.clone();
        existing.stack = notebook.stack.clone();
        Ok(existing.clone())
    }
}
