//! # Recovery Checkpoint Manager
//!
//! Before the editor is launched, the exact buffer handed to it is persisted
//! together with the note it belongs to. The checkpoint is only cleared once
//! the service has acknowledged the save, so a crash, a killed editor, a
//! network failure or a rejected save never loses content: `notecli note edit
//! --recover` picks the buffer up again.
//!
//! ```text
//!   Empty ──write──▶ Checkpointed ──confirmed save──▶ Empty
//!                        │  ▲
//!                        └──┘ any failure (checkpoint kept)
//! ```
//!
//! At most one checkpoint exists; writing replaces the previous one.

use crate::error::{NoteError, Result};
use crate::model::Guid;
use crate::store::LocalStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named options for one edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOptions {
    /// Edit the service markup directly instead of the Markdown form.
    #[serde(default)]
    pub raw: bool,
    /// Resume from the saved checkpoint instead of fetching the note.
    #[serde(default)]
    pub use_recovery_point: bool,
}

impl EditOptions {
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    pub fn recover(mut self, recover: bool) -> Self {
        self.use_recovery_point = recover;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "guid", rename_all = "snake_case")]
pub enum CheckpointTarget {
    Existing(Guid),
    New,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub target: CheckpointTarget,
    /// Title to save under when the buffer carries none (raw edits).
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notebook: Option<Guid>,
    /// The buffer exactly as handed to, or returned from, the editor.
    pub content: String,
    pub options: EditOptions,
    pub saved_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(target: CheckpointTarget, content: impl Into<String>, options: EditOptions) -> Self {
        Self {
            target,
            title: String::new(),
            notebook: None,
            content: content.into(),
            options,
            saved_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_notebook(mut self, notebook: Option<Guid>) -> Self {
        self.notebook = notebook;
        self
    }
}

pub struct CheckpointManager<'a, S: LocalStore> {
    store: &'a mut S,
}

impl<'a, S: LocalStore> CheckpointManager<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Persists `checkpoint`, replacing any existing one.
    ///
    /// Any storage failure is reported as [`NoteError::Checkpoint`]; callers
    /// must not launch the editor after it.
    pub fn write(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        self.store
            .write_checkpoint(checkpoint)
            .map_err(|e| NoteError::Checkpoint(e.to_string()))?;
        tracing::debug!(edit_target = ?checkpoint.target, bytes = checkpoint.content.len(), "checkpoint written");
        Ok(())
    }

    /// Replaces the buffer of the current checkpoint, keeping its target.
    pub fn update_content(&mut self, checkpoint: &Checkpoint, content: &str) -> Result<Checkpoint> {
        let mut next = checkpoint.clone();
        next.content = content.to_string();
        next.saved_at = Utc::now();
        self.write(&next)?;
        Ok(next)
    }

    pub fn read(&self) -> Result<Checkpoint> {
        self.store
            .read_checkpoint()?
            .ok_or(NoteError::NoRecoveryPoint)
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.store.read_checkpoint()?.is_some())
    }

    /// Only call after the service confirmed the save.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear_checkpoint()?;
        tracing::debug!("checkpoint cleared");
        Ok(())
    }
}
