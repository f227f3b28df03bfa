use crate::error::{NoteError, Result};
use crate::index::{EntityKind, Selector};
use crate::model::{Guid, Notebook};
use crate::service::{NoteFilter, NoteService};
use crate::store::LocalStore;
use std::collections::HashMap;

/// How many search hits are scanned for an exact title match.
const TITLE_SEARCH_LIMIT: usize = 250;

/// Resolves a note selector to its GUID.
///
/// Indexes refer to the last `note list`. Titles are searched on the service,
/// optionally within `notebook`, and must match exactly.
pub fn resolve_note<S: LocalStore, R: NoteService>(
    store: &S,
    service: &R,
    selector: &Selector,
    notebook: Option<&Guid>,
) -> Result<Guid> {
    match selector {
        Selector::Index(index) => Ok(store.resolve_index(EntityKind::Note, *index)?.id),
        Selector::Name(title) => {
            let filter = NoteFilter::default()
                .words(title.clone())
                .notebook(notebook.cloned());
            service
                .search(&filter, 0, TITLE_SEARCH_LIMIT)?
                .into_iter()
                .find(|n| n.title == *title)
                .map(|n| n.guid)
                .ok_or_else(|| NoteError::NotFound(format!("note \"{}\"", title)))
        }
    }
}

/// Resolves a notebook selector: an index into the last `notebook list`, or a
/// notebook name.
pub fn resolve_notebook<S: LocalStore, R: NoteService>(
    store: &S,
    service: &R,
    selector: &Selector,
) -> Result<Notebook> {
    let notebooks = service.list_notebooks()?;
    match selector {
        Selector::Index(index) => {
            let entity = store.resolve_index(EntityKind::Notebook, *index)?;
            notebooks
                .into_iter()
                .find(|nb| nb.guid.as_ref() == Some(&entity.id))
                .ok_or_else(|| NoteError::NotFound(format!("notebook \"{}\"", entity.label)))
        }
        Selector::Name(name) => notebooks
            .into_iter()
            .find(|nb| nb.name == *name)
            .ok_or_else(|| NoteError::NotFound(format!("notebook \"{}\"", name))),
    }
}

/// Like [`resolve_notebook`] for optional `--notebook` arguments, returning the GUID.
pub fn resolve_notebook_arg<S: LocalStore, R: NoteService>(
    store: &S,
    service: &R,
    notebook: Option<&str>,
) -> Result<Option<Guid>> {
    match notebook {
        Some(arg) => Ok(resolve_notebook(store, service, &Selector::parse(arg))?.guid),
        None => Ok(None),
    }
}

pub fn notebook_names<R: NoteService>(service: &R) -> Result<HashMap<Guid, String>> {
    Ok(service
        .list_notebooks()?
        .into_iter()
        .filter_map(|nb| nb.guid.map(|guid| (guid, nb.name)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexTable;
    use crate::model::Note;
    use crate::service::memory::InMemoryService;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn test_resolve_note_by_index_uses_saved_listing() {
        let mut store = InMemoryStore::new();
        store
            .save_listing(&IndexTable::assign(
                EntityKind::Note,
                vec![(Guid::from("g1"), "One".to_string())],
            ))
            .unwrap();
        let service = InMemoryService::new();
        let guid = resolve_note(&store, &service, &Selector::Index(1), None).unwrap();
        assert_eq!(guid, Guid::from("g1"));
        assert!(matches!(
            resolve_note(&store, &service, &Selector::Index(2), None),
            Err(NoteError::NotFound(_))
        ));
    }

    #[test]
    fn test_resolve_note_by_exact_title() {
        let store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        service.create_note(&Note::new("Plan B")).unwrap();
        let wanted = service.create_note(&Note::new("Plan")).unwrap();

        let guid = resolve_note(&store, &service, &Selector::parse("Plan"), None).unwrap();
        assert_eq!(Some(guid), wanted.guid);
        assert!(matches!(
            resolve_note(&store, &service, &Selector::parse("Plan C"), None),
            Err(NoteError::NotFound(_))
        ));
    }

    #[test]
    fn test_numeric_title_needs_prefix() {
        let store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let wanted = service.create_note(&Note::new("2024")).unwrap();

        assert!(matches!(
            resolve_note(&store, &service, &Selector::parse("2024"), None),
            Err(NoteError::NotFound(_))
        ));
        let guid = resolve_note(&store, &service, &Selector::parse("=2024"), None).unwrap();
        assert_eq!(Some(guid), wanted.guid);
    }

    #[test]
    fn test_resolve_notebook_by_name() {
        let store = InMemoryStore::new();
        let service = InMemoryService::new();
        let notebook = resolve_notebook(&store, &service, &Selector::parse("Notes")).unwrap();
        assert!(notebook.is_default);
        assert!(resolve_notebook_arg(&store, &service, Some("Nope")).is_err());
        assert_eq!(resolve_notebook_arg(&store, &service, None).unwrap(), None);
    }
}
