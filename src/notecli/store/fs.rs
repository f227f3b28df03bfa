use super::LocalStore;
use crate::checkpoint::Checkpoint;
use crate::error::{NoteError, Result};
use crate::index::{EntityKind, IndexTable};
use crate::model::{Credential, Settings};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const CREDENTIALS_FILE: &str = "credentials.json";
const SETTINGS_FILE: &str = "settings.json";
const RECOVERY_FILE: &str = "recovery.json";

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn listing_filename(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Note => "listing-notes.json",
            EntityKind::Notebook => "listing-notebooks.json",
            EntityKind::Credential => "listing-credentials.json",
        }
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(NoteError::Io(e)),
    };
    let value = serde_json::from_str(&content).map_err(NoteError::Serialization)?;
    Ok(Some(value))
}

/// Writes through a temp file in the same directory and renames it into
/// place, so readers see either the old or the new content. With `durable`
/// the data is synced to disk before the rename, and the directory after it
/// so the rename itself survives a crash.
pub(crate) fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T, durable: bool) -> Result<()> {
    fs::create_dir_all(dir).map_err(NoteError::Io)?;
    let content = serde_json::to_vec_pretty(value).map_err(NoteError::Serialization)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(NoteError::Io)?;
    tmp.write_all(&content).map_err(NoteError::Io)?;
    tmp.flush().map_err(NoteError::Io)?;
    if durable {
        tmp.as_file().sync_all().map_err(NoteError::Io)?;
    }
    tmp.persist(dir.join(name))
        .map_err(|e| NoteError::Io(e.error))?;
    if durable {
        sync_dir(dir)?;
    }
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(NoteError::Io)
}

// Directories cannot be opened as files here; the rename is as durable as
// the platform makes it.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

impl LocalStore for FileStore {
    fn save_listing(&mut self, table: &IndexTable) -> Result<()> {
        write_json(&self.root, Self::listing_filename(table.kind()), table, false)
    }

    fn get_listing(&self, kind: EntityKind) -> Result<IndexTable> {
        let table: Option<IndexTable> = read_json(&self.root.join(Self::listing_filename(kind)))?;
        match table {
            Some(table) if table.kind() == kind => Ok(table),
            Some(_) => Err(NoteError::Store(format!(
                "saved {} listing has the wrong kind",
                kind
            ))),
            None => Ok(IndexTable::empty(kind)),
        }
    }

    fn get_credentials(&self) -> Result<Vec<Credential>> {
        Ok(read_json(&self.root.join(CREDENTIALS_FILE))?.unwrap_or_default())
    }

    fn save_credentials(&mut self, credentials: &[Credential]) -> Result<()> {
        write_json(&self.root, CREDENTIALS_FILE, &credentials, false)
    }

    fn get_settings(&self) -> Result<Settings> {
        Ok(read_json(&self.root.join(SETTINGS_FILE))?.unwrap_or_default())
    }

    fn store_settings(&mut self, settings: &Settings) -> Result<()> {
        write_json(&self.root, SETTINGS_FILE, settings, false)
    }

    fn write_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        write_json(&self.root, RECOVERY_FILE, checkpoint, true)
    }

    fn read_checkpoint(&self) -> Result<Option<Checkpoint>> {
        read_json(&self.root.join(RECOVERY_FILE))
    }

    fn clear_checkpoint(&mut self) -> Result<()> {
        match fs::remove_file(self.root.join(RECOVERY_FILE)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NoteError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{CheckpointTarget, EditOptions};
    use crate::model::{CredentialKind, Guid};
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("store"));
        (dir, store)
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let (_dir, store) = store();
        assert!(store.get_listing(EntityKind::Note).unwrap().is_empty());
        assert!(store.get_credentials().unwrap().is_empty());
        assert_eq!(store.get_settings().unwrap(), Settings::default());
        assert!(store.read_checkpoint().unwrap().is_none());
    }

    #[test]
    fn test_listing_persists_per_kind() {
        let (_dir, mut store) = store();
        let notes = IndexTable::assign(
            EntityKind::Note,
            vec![(Guid::from("n1"), "First".to_string())],
        );
        let books = IndexTable::assign(
            EntityKind::Notebook,
            vec![(Guid::from("b1"), "Work".to_string())],
        );
        store.save_listing(&notes).unwrap();
        store.save_listing(&books).unwrap();

        let reopened = FileStore::new(store.root().to_path_buf());
        assert_eq!(reopened.get_listing(EntityKind::Note).unwrap(), notes);
        assert_eq!(
            reopened.resolve_index(EntityKind::Notebook, 1).unwrap().id,
            Guid::from("b1")
        );
    }

    #[test]
    fn test_credentials_keep_order() {
        let (_dir, mut store) = store();
        let creds = vec![
            Credential::new("b", "s1", CredentialKind::Standard),
            Credential::new("a", "s2", CredentialKind::Sandbox),
        ];
        store.save_credentials(&creds).unwrap();
        assert_eq!(store.get_credentials().unwrap(), creds);
    }

    #[test]
    fn test_checkpoint_survives_reopen_and_clears() {
        let (_dir, mut store) = store();
        let cp = Checkpoint::new(
            CheckpointTarget::Existing(Guid::from("n1")),
            "Title\n\nbody",
            EditOptions::default(),
        );
        store.write_checkpoint(&cp).unwrap();

        let mut reopened = FileStore::new(store.root().to_path_buf());
        assert_eq!(reopened.read_checkpoint().unwrap(), Some(cp));

        reopened.clear_checkpoint().unwrap();
        assert!(reopened.read_checkpoint().unwrap().is_none());
        // Clearing twice is fine.
        reopened.clear_checkpoint().unwrap();
    }

    #[test]
    fn test_durable_write_replaces_file() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("store");
        write_json(&nested, "value.json", &vec![1, 2], true).unwrap();
        write_json(&nested, "value.json", &vec![3], true).unwrap();
        let value: Option<Vec<u32>> = read_json(&nested.join("value.json")).unwrap();
        assert_eq!(value, Some(vec![3]));
        let leftovers = fs::read_dir(&nested).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (_dir, store) = store();
        fs::create_dir_all(store.root()).unwrap();
        fs::write(store.root().join(SETTINGS_FILE), "{not json").unwrap();
        assert!(matches!(
            store.get_settings(),
            Err(NoteError::Serialization(_))
        ));
    }
}
