use super::{next_timestamp, page, summarize, NoteFilter, NoteService};
use crate::error::{NoteError, Result};
use crate::model::{Guid, Note, NoteSummary, Notebook, Settings};
use crate::store::fs::{read_json, write_json};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const ACCOUNT_FILE: &str = "account.json";
const NOTEBOOKS_FILE: &str = "notebooks.json";
const NOTES_DIR: &str = "notes";

#[derive(Debug, Serialize, Deserialize)]
struct Account {
    secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredNote {
    #[serde(flatten)]
    note: Note,
    #[serde(default)]
    trashed: bool,
}

/// A note service backed by a local directory.
///
/// ```text
/// <root>/<standard|sandbox>/<account>/
/// ├── account.json     # secret the account was opened with
/// ├── notebooks.json
/// └── notes/<guid>.json
/// ```
#[derive(Debug)]
pub struct FileService {
    account_dir: PathBuf,
}

impl FileService {
    /// Opens the account of the active credential in `settings`.
    ///
    /// The first connection creates the account with a default notebook.
    /// Later connections must present the same secret.
    pub fn connect(root: &Path, settings: &Settings) -> Result<Self> {
        let credential = settings
            .credential
            .as_ref()
            .filter(|_| settings.is_authenticated())
            .ok_or_else(|| {
                NoteError::RemoteUnavailable(
                    "not logged in, activate a credential with `notecli user set credential <index>`"
                        .to_string(),
                )
            })?;

        let account_dir = root
            .join(credential.kind.to_string())
            .join(account_dirname(&credential.name));
        let service = Self { account_dir };

        match read_json::<Account>(&service.account_dir.join(ACCOUNT_FILE))? {
            Some(account) if account.secret == settings.api_key => {}
            Some(_) => {
                return Err(NoteError::RemoteUnavailable(format!(
                    "authentication failed for {}",
                    credential.name
                )))
            }
            None => {
                tracing::info!(account = %credential.name, kind = %credential.kind, "creating account");
                write_json(
                    &service.account_dir,
                    ACCOUNT_FILE,
                    &Account {
                        secret: settings.api_key.clone(),
                    },
                    false,
                )?;
                let mut default = Notebook::new("Notes");
                default.guid = Some(Guid::new());
                default.is_default = true;
                service.save_notebooks(&[default])?;
            }
        }

        Ok(service)
    }

    fn notes_dir(&self) -> PathBuf {
        self.account_dir.join(NOTES_DIR)
    }

    fn note_filename(guid: &Guid) -> String {
        format!("{}.json", guid)
    }

    fn load_note(&self, guid: &Guid) -> Result<Option<StoredNote>> {
        read_json(&self.notes_dir().join(Self::note_filename(guid)))
    }

    fn save_note(&self, note: &Note, trashed: bool) -> Result<()> {
        let guid = note
            .guid
            .as_ref()
            .ok_or_else(|| NoteError::Validation("note has no identifier".into()))?;
        let stored = StoredNote {
            note: note.clone(),
            trashed,
        };
        write_json(&self.notes_dir(), &Self::note_filename(guid), &stored, false)
    }

    fn live_note(&self, guid: &Guid) -> Result<Note> {
        match self.load_note(guid)? {
            Some(stored) if !stored.trashed => Ok(stored.note),
            _ => Err(NoteError::NotFound(format!("note {}", guid))),
        }
    }

    fn all_notes(&self) -> Result<Vec<StoredNote>> {
        let entries = match fs::read_dir(self.notes_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(NoteError::Io(e)),
        };

        let mut notes = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stored) = read_json::<StoredNote>(&path)? {
                notes.push(stored);
            }
        }
        Ok(notes)
    }

    fn latest_write(&self) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
        Ok(self
            .all_notes()?
            .into_iter()
            .filter_map(|s| s.note.updated)
            .max())
    }

    fn load_notebooks(&self) -> Result<Vec<Notebook>> {
        Ok(read_json(&self.account_dir.join(NOTEBOOKS_FILE))?.unwrap_or_default())
    }

    fn save_notebooks(&self, notebooks: &[Notebook]) -> Result<()> {
        write_json(&self.account_dir, NOTEBOOKS_FILE, &notebooks, false)
    }

    fn resolve_notebook(&self, notebook: &Option<Guid>) -> Result<Option<Guid>> {
        let notebooks = self.load_notebooks()?;
        match notebook {
            Some(guid) if notebooks.iter().any(|nb| nb.guid.as_ref() == Some(guid)) => {
                Ok(Some(guid.clone()))
            }
            Some(guid) => Err(NoteError::NotFound(format!("notebook {}", guid))),
            None => Ok(notebooks
                .iter()
                .find(|nb| nb.is_default)
                .and_then(|nb| nb.guid.clone())),
        }
    }
}

/// Account names become directory names; anything unusual is replaced.
fn account_dirname(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl NoteService for FileService {
    fn get_note(&self, guid: &Guid) -> Result<Note> {
        self.live_note(guid)
    }

    fn create_note(&mut self, note: &Note) -> Result<Note> {
        let notebook = self.resolve_notebook(&note.notebook)?;
        let now = next_timestamp(self.latest_write()?);
        let stored = Note {
            guid: Some(Guid::new()),
            notebook,
            created: Some(now),
            updated: Some(now),
            ..note.clone()
        };
        self.save_note(&stored, false)?;
        tracing::info!(guid = ?stored.guid, title = %stored.title, "note created");
        Ok(stored)
    }

    fn update_note(&mut self, guid: &Guid, note: &Note) -> Result<Note> {
        let existing = self.live_note(guid)?;
        let notebook = match note.notebook {
            Some(_) => self.resolve_notebook(&note.notebook)?,
            None => existing.notebook.clone(),
        };
        let stored = Note {
            guid: Some(guid.clone()),
            notebook,
            created: existing.created,
            updated: Some(next_timestamp(self.latest_write()?)),
            ..note.clone()
        };
        self.save_note(&stored, false)?;
        tracing::info!(%guid, title = %stored.title, "note updated");
        Ok(stored)
    }

    fn delete_note(&mut self, guid: &Guid) -> Result<()> {
        let note = self.live_note(guid)?;
        self.save_note(&note, true)?;
        tracing::info!(%guid, "note moved to trash");
        Ok(())
    }

    fn search(&self, filter: &NoteFilter, offset: usize, count: usize) -> Result<Vec<NoteSummary>> {
        let hits = self
            .all_notes()?
            .into_iter()
            .filter(|stored| !stored.trashed && filter.matches(&stored.note))
            .filter_map(|stored| {
                let guid = stored.note.guid.clone()?;
                Some(summarize(&stored.note, &guid))
            })
            .collect();
        Ok(page(hits, offset, count))
    }

    fn list_notebooks(&self) -> Result<Vec<Notebook>> {
        self.load_notebooks()
    }

    fn create_notebook(&mut self, notebook: &Notebook, make_default: bool) -> Result<Notebook> {
        let mut notebooks = self.load_notebooks()?;
        if notebooks.iter().any(|nb| nb.name == notebook.name) {
            return Err(NoteError::DuplicateName(notebook.name.clone()));
        }
        if make_default {
            for nb in &mut notebooks {
                nb.is_default = false;
            }
        }
        let stored = Notebook {
            guid: Some(Guid::new()),
            is_default: make_default,
            ..notebook.clone()
        };
        notebooks.push(stored.clone());
        self.save_notebooks(&notebooks)?;
        tracing::info!(name = %stored.name, "notebook created");
        Ok(stored)
    }

    fn update_notebook(&mut self, guid: &Guid, notebook: &Notebook) -> Result<Notebook> {
        let mut notebooks = self.load_notebooks()?;
        if notebooks
            .iter()
            .any(|nb| nb.name == notebook.name && nb.guid.as_ref() != Some(guid))
        {
            return Err(NoteError::DuplicateName(notebook.name.clone()));
        }
        let existing = notebooks
            .iter_mut()
            .find(|nb| nb.guid.as_ref() == Some(guid))
            .ok_or_else(|| NoteError::NotFound(format!("notebook {}", guid)))?;
        existing.name = notebook.name.clone();
        existing.stack = notebook.stack.clone();
        let updated = existing.clone();
        self.save_notebooks(&notebooks)?;
        tracing::info!(%guid, name = %updated.name, "notebook updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Credential, CredentialKind};
    use tempfile::TempDir;

    fn settings(name: &str, secret: &str) -> Settings {
        Settings {
            api_key: secret.to_string(),
            credential: Some(Credential::new(name, secret, CredentialKind::Standard)),
        }
    }

    #[test]
    fn test_connect_requires_active_credential() {
        let dir = TempDir::new().unwrap();
        let err = FileService::connect(dir.path(), &Settings::default()).unwrap_err();
        assert!(matches!(err, NoteError::RemoteUnavailable(_)));
    }

    #[test]
    fn test_connect_rejects_wrong_secret() {
        let dir = TempDir::new().unwrap();
        FileService::connect(dir.path(), &settings("me", "s1")).unwrap();
        let err = FileService::connect(dir.path(), &settings("me", "other")).unwrap_err();
        assert!(matches!(err, NoteError::RemoteUnavailable(_)));
    }

    #[test]
    fn test_first_connect_creates_default_notebook() {
        let dir = TempDir::new().unwrap();
        let service = FileService::connect(dir.path(), &settings("me", "s1")).unwrap();
        let books = service.list_notebooks().unwrap();
        assert_eq!(books.len(), 1);
        assert!(books[0].is_default);
    }

    #[test]
    fn test_notes_persist_across_connections() {
        let dir = TempDir::new().unwrap();
        let mut service = FileService::connect(dir.path(), &settings("me", "s1")).unwrap();
        let created = service
            .create_note(&Note::new("Groceries").with_content("<en-note>milk</en-note>"))
            .unwrap();
        let guid = created.guid.clone().unwrap();

        let service = FileService::connect(dir.path(), &settings("me", "s1")).unwrap();
        let fetched = service.get_note(&guid).unwrap();
        assert_eq!(fetched.title, "Groceries");
        assert_eq!(fetched.notebook, created.notebook);
    }

    #[test]
    fn test_search_and_trash() {
        let dir = TempDir::new().unwrap();
        let mut service = FileService::connect(dir.path(), &settings("me", "s1")).unwrap();
        let first = service.create_note(&Note::new("alpha")).unwrap();
        service.create_note(&Note::new("beta")).unwrap();

        let all = service.search(&NoteFilter::default(), 0, 10).unwrap();
        assert_eq!(all[0].title, "beta");
        assert_eq!(all[1].title, "alpha");

        service.delete_note(first.guid.as_ref().unwrap()).unwrap();
        let left = service.search(&NoteFilter::default(), 0, 10).unwrap();
        assert_eq!(left.len(), 1);
        assert!(matches!(
            service.get_note(first.guid.as_ref().unwrap()),
            Err(NoteError::NotFound(_))
        ));
    }

    #[test]
    fn test_accounts_are_separate() {
        let dir = TempDir::new().unwrap();
        let mut mine = FileService::connect(dir.path(), &settings("me", "s1")).unwrap();
        mine.create_note(&Note::new("mine")).unwrap();
        let theirs = FileService::connect(dir.path(), &settings("you", "s2")).unwrap();
        assert!(theirs.search(&NoteFilter::default(), 0, 10).unwrap().is_empty());
    }

    #[test]
    fn test_account_dirname() {
        assert_eq!(account_dirname("work/me@x"), "work_me_x");
    }
}
