use super::LocalStore;
use crate::checkpoint::Checkpoint;
use crate::error::{NoteError, Result};
use crate::index::{EntityKind, IndexTable};
use crate::model::{Credential, Settings};
use std::collections::HashMap;

/// Non-persistent store for tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    listings: HashMap<EntityKind, IndexTable>,
    credentials: Vec<Credential>,
    settings: Settings,
    checkpoint: Option<Checkpoint>,
    fail_checkpoint_writes: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `write_checkpoint` fail, as a full disk would.
    pub fn with_failing_checkpoints(mut self) -> Self {
        self.fail_checkpoint_writes = true;
        self
    }
}

impl LocalStore for InMemoryStore {
    fn save_listing(&mut self, table: &IndexTable) -> Result<()> {
        self.listings.insert(table.kind(), table.clone());
        Ok(())
    }

    fn get_listing(&self, kind: EntityKind) -> Result<IndexTable> {
        Ok(self
            .listings
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| IndexTable::empty(kind)))
    }

    fn get_credentials(&self) -> Result<Vec<Credential>> {
        Ok(self.credentials.clone())
    }

    fn save_credentials(&mut self, credentials: &[Credential]) -> Result<()> {
        self.credentials = credentials.to_vec();
        Ok(())
    }

    fn get_settings(&self) -> Result<Settings> {
        Ok(self.settings.clone())
    }

    fn store_settings(&mut self, settings: &Settings) -> Result<()> {
        self.settings = settings.clone();
        Ok(())
    }

    fn write_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        if self.fail_checkpoint_writes {
            return Err(NoteError::Store("checkpoint storage is read-only".into()));
        }
        self.checkpoint = Some(checkpoint.clone());
        Ok(())
    }

    fn read_checkpoint(&self) -> Result<Option<Checkpoint>> {
        Ok(self.checkpoint.clone())
    }

    fn clear_checkpoint(&mut self) -> Result<()> {
        self.checkpoint = None;
        Ok(())
    }
}
