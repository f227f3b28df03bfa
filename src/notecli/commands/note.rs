use super::helpers::{notebook_names, resolve_note};
use super::{CmdMessage, CmdResult, ListedNote, NoteView};
use crate::batch::{self, BatchFailure, BatchRequest};
use crate::codec::{empty_note, ContentCodec};
use crate::error::{NoteError, Result};
use crate::index::{EntityKind, IndexTable, Selector};
use crate::model::{Guid, Note};
use crate::service::{NoteFilter, NoteService};
use crate::store::LocalStore;

/// Creates a note with empty content.
pub fn create<R: NoteService>(
    service: &mut R,
    title: &str,
    notebook: Option<Guid>,
) -> Result<CmdResult> {
    let title = title.trim();
    if title.is_empty() {
        return Err(NoteError::Validation(
            "a title is required, pass --title or use --edit".into(),
        ));
    }
    let note = Note::new(title)
        .in_notebook(notebook)
        .with_content(empty_note());
    let saved = service.create_note(&note)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Note \"{}\" created", saved.title)));
    Ok(result.with_affected_notes(vec![saved]))
}

pub fn view<S: LocalStore, R: NoteService>(
    store: &S,
    service: &R,
    codec: &dyn ContentCodec,
    selector: &Selector,
    notebook: Option<&Guid>,
    raw: bool,
) -> Result<CmdResult> {
    let guid = resolve_note(store, service, selector, notebook)?;
    let note = service.get_note(&guid)?;
    let body = if raw {
        note.content.clone()
    } else {
        codec.to_editable(&note.content)?
    };
    let notebook_name = match &note.notebook {
        Some(nb) => notebook_names(service)?.remove(nb),
        None => None,
    };

    Ok(CmdResult::default().with_viewed(NoteView {
        note,
        notebook_name,
        body,
    }))
}

/// Searches the service and saves the result as the note index table.
pub fn list<S: LocalStore, R: NoteService>(
    store: &mut S,
    service: &R,
    filter: &NoteFilter,
    count: usize,
) -> Result<CmdResult> {
    let notes = service.search(filter, 0, count)?;
    let table = IndexTable::assign(
        EntityKind::Note,
        notes.iter().map(|n| (n.guid.clone(), n.title.clone())),
    );
    store.save_listing(&table)?;

    let names = notebook_names(service)?;
    let listed = notes
        .into_iter()
        .zip(table.entries())
        .map(|(note, entry)| ListedNote {
            index: entry.index,
            notebook_name: note.notebook.as_ref().and_then(|nb| names.get(nb).cloned()),
            note,
        })
        .collect::<Vec<_>>();

    let mut result = CmdResult::default();
    if listed.is_empty() {
        result.add_message(CmdMessage::info("No notes found."));
    }
    Ok(result.with_listed_notes(listed))
}

/// Moves notes to the trash.
///
/// A single non-numeric selector is a title. Otherwise every selector is an
/// index of the last listing; they are removed in shift-safe order and the
/// saved listing is updated as they go.
pub fn delete<S: LocalStore, R: NoteService, I: AsRef<str>>(
    store: &mut S,
    service: &mut R,
    selectors: &[I],
    notebook: Option<&Guid>,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();

    if let [single] = selectors {
        if let Selector::Name(title) = Selector::parse(single.as_ref()) {
            let guid = resolve_note(store, service, &Selector::Name(title.clone()), notebook)?;
            service.delete_note(&guid)?;
            result.add_message(CmdMessage::success(format!(
                "Note \"{}\" moved to trash",
                title
            )));
            return Ok(result);
        }
    }

    let request = BatchRequest::parse(selectors);
    if request.indexes.is_empty() && request.rejected.is_empty() {
        return Err(NoteError::Validation("no notes given".into()));
    }

    let mut table = store.get_listing(EntityKind::Note)?;
    let outcome = batch::remove_in_order(&mut table, &request, |entity| {
        service.delete_note(&entity.id)
    });
    if !outcome.removed.is_empty() {
        store.save_listing(&table)?;
    }

    for removal in &outcome.removed {
        result.add_message(CmdMessage::success(format!(
            "Note {} \"{}\" moved to trash",
            removal.original, removal.entity.label
        )));
    }
    for failure in &outcome.failures {
        result.add_message(match failure {
            BatchFailure::NotANumber(_) => CmdMessage::warning(failure.to_string()),
            _ => CmdMessage::error(failure.to_string()),
        });
    }
    Ok(result)
}

/// Renames a note and/or moves it to another notebook, without the editor.
pub fn update<S: LocalStore, R: NoteService>(
    store: &S,
    service: &mut R,
    selector: &Selector,
    notebook: Option<&Guid>,
    title: Option<&str>,
    move_to: Option<Guid>,
) -> Result<CmdResult> {
    let title = title.map(str::trim);
    if title == Some("") {
        return Err(NoteError::Validation("title cannot be empty".into()));
    }
    if title.is_none() && move_to.is_none() {
        return Err(NoteError::Validation("no changes specified".into()));
    }

    let guid = resolve_note(store, service, selector, notebook)?;
    let mut note = service.get_note(&guid)?;
    let old_title = note.title.clone();
    let moving = move_to.is_some();
    if let Some(title) = title {
        note.title = title.to_string();
    }
    if let Some(target) = move_to {
        note.notebook = Some(target);
    }
    let saved = service.update_note(&guid, &note)?;

    let mut result = CmdResult::default();
    if saved.title != old_title {
        result.add_message(CmdMessage::success(format!(
            "Note \"{}\" renamed to \"{}\"",
            old_title, saved.title
        )));
    }
    if moving {
        result.add_message(CmdMessage::success(format!("Note \"{}\" moved", saved.title)));
    }
    Ok(result.with_affected_notes(vec![saved]))
}
