//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every
//! notecli operation, regardless of the UI in front of it.
//!
//! The facade:
//! - **Dispatches** to the command functions
//! - **Normalizes inputs**: user-typed selectors become [`Selector`]s, and
//!   `--notebook` arguments are resolved to notebook GUIDs
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no I/O of its own and formats nothing.
//!
//! ## Two facades
//!
//! [`UserApi`] works on the local store only, so credentials can be managed
//! before any service connection exists. [`NoteApi`] needs both the store and
//! an authenticated [`NoteService`].
//!
//! Both are generic over their backends: `FileStore`/`FileService` in the
//! binary, `InMemoryStore`/`InMemoryService` in tests.

use crate::checkpoint::EditOptions;
use crate::codec::MarkdownCodec;
use crate::commands::{self, edit::EditTarget, helpers};
use crate::editor::EditorLauncher;
use crate::error::Result;
use crate::index::Selector;
use crate::model::{CredentialKind, Settings};
use crate::service::{NoteFilter, NoteService};
use crate::store::LocalStore;

pub struct NoteApi<S: LocalStore, R: NoteService> {
    store: S,
    service: R,
    codec: MarkdownCodec,
}

impl<S: LocalStore, R: NoteService> NoteApi<S, R> {
    pub fn new(store: S, service: R) -> Self {
        Self {
            store,
            service,
            codec: MarkdownCodec::new(),
        }
    }

    pub fn create_note(&mut self, title: &str, notebook: Option<&str>) -> Result<CmdResult> {
        let notebook = helpers::resolve_notebook_arg(&self.store, &self.service, notebook)?;
        commands::note::create(&mut self.service, title, notebook)
    }

    /// Creates a note through the editor. A missing title defaults to the
    /// first line of the buffer, or "Untitled note".
    pub fn create_note_in_editor(
        &mut self,
        editor: &dyn EditorLauncher,
        title: Option<&str>,
        notebook: Option<&str>,
        raw: bool,
    ) -> Result<CmdResult> {
        let notebook = helpers::resolve_notebook_arg(&self.store, &self.service, notebook)?;
        let title = match title.map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ if raw => commands::edit::UNTITLED.to_string(),
            _ => String::new(),
        };
        let target = EditTarget::New { title, notebook };
        commands::edit::run(
            &mut self.store,
            &mut self.service,
            &self.codec,
            editor,
            Some(target),
            EditOptions::default().raw(raw),
        )
    }

    pub fn edit_note(
        &mut self,
        editor: &dyn EditorLauncher,
        selector: &str,
        raw: bool,
    ) -> Result<CmdResult> {
        let guid = helpers::resolve_note(&self.store, &self.service, &Selector::parse(selector), None)?;
        commands::edit::run(
            &mut self.store,
            &mut self.service,
            &self.codec,
            editor,
            Some(EditTarget::Existing(guid)),
            EditOptions::default().raw(raw),
        )
    }

    /// Resumes the edit saved in the recovery checkpoint.
    pub fn recover_edit(&mut self, editor: &dyn EditorLauncher) -> Result<CmdResult> {
        commands::edit::run(
            &mut self.store,
            &mut self.service,
            &self.codec,
            editor,
            None,
            EditOptions::default().recover(true),
        )
    }

    pub fn update_note(
        &mut self,
        selector: &str,
        title: Option<&str>,
        move_to: Option<&str>,
    ) -> Result<CmdResult> {
        let move_to = helpers::resolve_notebook_arg(&self.store, &self.service, move_to)?;
        commands::note::update(
            &self.store,
            &mut self.service,
            &Selector::parse(selector),
            None,
            title,
            move_to,
        )
    }

    pub fn view_note(&self, selector: &str, notebook: Option<&str>, raw: bool) -> Result<CmdResult> {
        let notebook = helpers::resolve_notebook_arg(&self.store, &self.service, notebook)?;
        commands::note::view(
            &self.store,
            &self.service,
            &self.codec,
            &Selector::parse(selector),
            notebook.as_ref(),
            raw,
        )
    }

    pub fn list_notes(
        &mut self,
        search: Option<&str>,
        notebook: Option<&str>,
        count: usize,
    ) -> Result<CmdResult> {
        let notebook = helpers::resolve_notebook_arg(&self.store, &self.service, notebook)?;
        let mut filter = NoteFilter::default().notebook(notebook);
        if let Some(words) = search.filter(|s| !s.trim().is_empty()) {
            filter = filter.words(words.trim());
        }
        commands::note::list(&mut self.store, &self.service, &filter, count)
    }

    pub fn delete_notes<I: AsRef<str>>(
        &mut self,
        selectors: &[I],
        notebook: Option<&str>,
    ) -> Result<CmdResult> {
        let notebook = helpers::resolve_notebook_arg(&self.store, &self.service, notebook)?;
        commands::note::delete(&mut self.store, &mut self.service, selectors, notebook.as_ref())
    }

    pub fn list_notebooks(&mut self) -> Result<CmdResult> {
        commands::notebook::list(&mut self.store, &self.service)
    }

    pub fn create_notebook(
        &mut self,
        name: &str,
        stack: Option<&str>,
        make_default: bool,
    ) -> Result<CmdResult> {
        commands::notebook::create(&mut self.service, name, stack, make_default)
    }

    pub fn update_notebook(
        &mut self,
        selector: &str,
        name: Option<&str>,
        stack: Option<&str>,
    ) -> Result<CmdResult> {
        commands::notebook::update(
            &self.store,
            &mut self.service,
            &Selector::parse(selector),
            name,
            stack,
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Credential management over the local store.
pub struct UserApi<S: LocalStore> {
    store: S,
}

impl<S: LocalStore> UserApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn add_credential(
        &mut self,
        name: &str,
        secret: &str,
        kind: CredentialKind,
    ) -> Result<CmdResult> {
        commands::user::add(&mut self.store, name, secret, kind)
    }

    pub fn list_credentials(&mut self) -> Result<CmdResult> {
        commands::user::list(&mut self.store)
    }

    pub fn remove_credentials<I: AsRef<str>>(&mut self, indexes: &[I]) -> Result<CmdResult> {
        commands::user::remove(&mut self.store, indexes)
    }

    pub fn set<I: AsRef<str>>(&mut self, args: &[I]) -> Result<CmdResult> {
        commands::user::set(&mut self.store, args)
    }

    pub fn logout(&mut self) -> Result<CmdResult> {
        commands::user::logout(&mut self.store)
    }

    pub fn settings(&self) -> Result<Settings> {
        self.store.get_settings()
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

pub use crate::commands::{CmdMessage, CmdResult, MessageLevel};
