use super::helpers::resolve_notebook;
use super::{CmdMessage, CmdResult, ListedNotebook};
use crate::error::{NoteError, Result};
use crate::index::{EntityKind, IndexTable, Selector};
use crate::model::{Guid, Notebook};
use crate::service::NoteService;
use crate::store::LocalStore;

/// Lists notebooks by name and saves the notebook index table.
pub fn list<S: LocalStore, R: NoteService>(store: &mut S, service: &R) -> Result<CmdResult> {
    let mut notebooks: Vec<(Guid, Notebook)> = service
        .list_notebooks()?
        .into_iter()
        .filter_map(|nb| nb.guid.clone().map(|guid| (guid, nb)))
        .collect();
    notebooks.sort_by(|(_, a), (_, b)| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let table = IndexTable::assign(
        EntityKind::Notebook,
        notebooks.iter().map(|(guid, nb)| (guid.clone(), nb.name.clone())),
    );
    store.save_listing(&table)?;

    let listed = notebooks
        .into_iter()
        .zip(table.entries())
        .map(|((_, notebook), entry)| ListedNotebook {
            index: entry.index,
            notebook,
        })
        .collect();
    Ok(CmdResult::default().with_listed_notebooks(listed))
}

pub fn create<R: NoteService>(
    service: &mut R,
    name: &str,
    stack: Option<&str>,
    make_default: bool,
) -> Result<CmdResult> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NoteError::Validation("notebook name is required".into()));
    }
    let mut notebook = Notebook::new(name);
    notebook.stack = normalize_stack(stack);
    let saved = service.create_notebook(&notebook, make_default)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Notebook \"{}\" created",
        saved.name
    )));
    Ok(result.with_affected_notebooks(vec![saved]))
}

/// Renames a notebook and/or changes its stack. An empty stack removes it.
pub fn update<S: LocalStore, R: NoteService>(
    store: &S,
    service: &mut R,
    selector: &Selector,
    name: Option<&str>,
    stack: Option<&str>,
) -> Result<CmdResult> {
    if name.is_none() && stack.is_none() {
        return Err(NoteError::Validation("no changes specified".into()));
    }
    if name.map(str::trim) == Some("") {
        return Err(NoteError::Validation("notebook name cannot be empty".into()));
    }

    let mut notebook = resolve_notebook(store, service, selector)?;
    let guid = notebook
        .guid
        .clone()
        .ok_or_else(|| NoteError::NotFound(format!("notebook \"{}\"", notebook.name)))?;
    let old_name = notebook.name.clone();
    if let Some(name) = name {
        notebook.name = name.trim().to_string();
    }
    if stack.is_some() {
        notebook.stack = normalize_stack(stack);
    }
    let saved = service.update_notebook(&guid, &notebook)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Notebook \"{}\" updated",
        old_name
    )));
    Ok(result.with_affected_notebooks(vec![saved]))
}

fn normalize_stack(stack: Option<&str>) -> Option<String> {
    stack
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::memory::InMemoryService;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn test_list_sorted_by_name_and_indexed() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        create(&mut service, "archive", None, false).unwrap();
        create(&mut service, "Work", Some("Jobs"), false).unwrap();

        let result = list(&mut store, &service).unwrap();
        let names: Vec<_> = result
            .listed_notebooks
            .iter()
            .map(|l| l.notebook.name.as_str())
            .collect();
        assert_eq!(names, vec!["archive", "Notes", "Work"]);
        assert_eq!(
            store.resolve_index(EntityKind::Notebook, 3).unwrap().label,
            "Work"
        );
    }

    #[test]
    fn test_create_default_notebook() {
        let mut service = InMemoryService::new();
        let result = create(&mut service, "Inbox", None, true).unwrap();
        assert!(result.affected_notebooks[0].is_default);
    }

    #[test]
    fn test_update_by_index() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        create(&mut service, "Work", None, false).unwrap();
        list(&mut store, &service).unwrap();

        update(&store, &mut service, &Selector::Index(2), Some("Job"), Some("Office")).unwrap();
        let books = service.list_notebooks().unwrap();
        let job = books.iter().find(|b| b.name == "Job").unwrap();
        assert_eq!(job.stack.as_deref(), Some("Office"));

        update(&store, &mut service, &Selector::parse("Job"), None, Some("")).unwrap();
        let books = service.list_notebooks().unwrap();
        assert!(books.iter().find(|b| b.name == "Job").unwrap().stack.is_none());
    }

    #[test]
    fn test_update_needs_changes() {
        let store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        assert!(matches!(
            update(&store, &mut service, &Selector::parse("Notes"), None, None),
            Err(NoteError::Validation(_))
        ));
    }
}
