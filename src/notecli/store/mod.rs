//! # Local Store
//!
//! Everything the client remembers between invocations lives behind the
//! [`LocalStore`] trait: the last listing of each entity kind (the index
//! tables), the credential registry, the settings record and the recovery
//! checkpoint.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: JSON files in the config directory, each replaced
//!   atomically on write.
//! - [`memory::InMemoryStore`]: no persistence, used by tests.
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! <config dir>/
//! ├── listing-notes.json      # last note listing (index table)
//! ├── listing-notebooks.json  # last notebook listing
//! ├── credentials.json        # credential registry, insertion order
//! ├── settings.json           # api key + active credential
//! ├── recovery.json           # in-flight edit checkpoint, if any
//! └── config.json             # user configuration (see config.rs)
//! ```
//!
//! The store does no locking: concurrent invocations mutating the same files
//! are not supported.

use crate::checkpoint::Checkpoint;
use crate::error::Result;
use crate::index::{EntityKind, EntityRef, IndexTable};
use crate::model::{Credential, Settings};

pub mod fs;
pub mod memory;

pub trait LocalStore {
    /// Replace the saved listing for `table.kind()`.
    fn save_listing(&mut self, table: &IndexTable) -> Result<()>;

    /// The latest listing of `kind`, or an empty table if none was saved.
    fn get_listing(&self, kind: EntityKind) -> Result<IndexTable>;

    fn resolve_index(&self, kind: EntityKind, index: usize) -> Result<EntityRef> {
        self.get_listing(kind)?.resolve(index).cloned()
    }

    /// All credentials in insertion order.
    fn get_credentials(&self) -> Result<Vec<Credential>>;

    fn save_credentials(&mut self, credentials: &[Credential]) -> Result<()>;

    fn get_settings(&self) -> Result<Settings>;

    fn store_settings(&mut self, settings: &Settings) -> Result<()>;

    /// Persist the checkpoint durably before returning, replacing any other.
    fn write_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<()>;

    fn read_checkpoint(&self) -> Result<Option<Checkpoint>>;

    /// Remove the checkpoint. Removing an absent checkpoint is not an error.
    fn clear_checkpoint(&mut self) -> Result<()>;
}
