//! # Credential Registry
//!
//! Credentials are kept in insertion order and addressed by their 1-based
//! position. The active credential lives in [`Settings`] by value, so removing
//! some other credential never changes which one is active.
//!
//! Removing the active credential logs out: the API key and the active
//! credential are cleared, and another credential has to be activated
//! explicitly.

use crate::batch::{self, BatchOutcome, BatchRequest};
use crate::error::{NoteError, Result};
use crate::index::{EntityKind, IndexTable};
use crate::model::{Credential, CredentialKind, Guid, Settings};
use crate::store::LocalStore;

pub struct CredentialRegistry<'a, S: LocalStore> {
    store: &'a mut S,
}

impl<'a, S: LocalStore> CredentialRegistry<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Appends a credential. Names are unique.
    pub fn add(&mut self, name: &str, secret: &str, kind: CredentialKind) -> Result<Credential> {
        let name = name.trim();
        let secret = secret.trim();
        if name.is_empty() {
            return Err(NoteError::Validation("credential name is required".into()));
        }
        if secret.is_empty() {
            return Err(NoteError::Validation("credential secret is required".into()));
        }

        let mut credentials = self.store.get_credentials()?;
        if credentials.iter().any(|c| c.name == name) {
            return Err(NoteError::DuplicateName(name.to_string()));
        }
        let credential = Credential::new(name, secret, kind);
        credentials.push(credential.clone());
        self.store.save_credentials(&credentials)?;
        tracing::info!(name, %kind, index = credentials.len(), "credential added");
        Ok(credential)
    }

    pub fn list_all(&self) -> Result<Vec<Credential>> {
        self.store.get_credentials()
    }

    /// The registry as an index table, keyed by credential name.
    pub fn table(&self) -> Result<IndexTable> {
        Ok(IndexTable::assign(
            EntityKind::Credential,
            self.list_all()?
                .into_iter()
                .map(|c| (Guid::from(c.name.clone()), c.name)),
        ))
    }

    pub fn get_by_index(&self, index: usize) -> Result<Credential> {
        let credentials = self.list_all()?;
        index
            .checked_sub(1)
            .and_then(|pos| credentials.get(pos))
            .cloned()
            .ok_or_else(|| NoteError::NotFound(format!("credential index {}", index)))
    }

    pub fn remove_by_index(&mut self, index: usize) -> Result<Credential> {
        let removed = self.get_by_index(index)?;
        let mut credentials = self.list_all()?;
        credentials.remove(index - 1);
        self.store.save_credentials(&credentials)?;
        tracing::info!(name = %removed.name, index, "credential removed");

        let settings = self.store.get_settings()?;
        if settings.credential.as_ref().map(|c| &c.name) == Some(&removed.name) {
            tracing::warn!(name = %removed.name, "active credential removed, logging out");
            self.store.store_settings(&Settings::default())?;
        }
        Ok(removed)
    }

    /// Removes several credentials by the indexes of the current listing.
    pub fn remove_batch(&mut self, request: &BatchRequest) -> Result<BatchOutcome> {
        let mut table = self.table()?;
        Ok(batch::remove_in_order(&mut table, request, |entity| {
            self.remove_by_index(entity.index).map(|_| ())
        }))
    }

    /// Makes the credential at `index` the active one and uses its secret as
    /// the API key.
    pub fn activate_by_index(&mut self, index: usize) -> Result<Settings> {
        let credential = self.get_by_index(index)?;
        let settings = Settings {
            api_key: credential.secret.clone(),
            credential: Some(credential),
        };
        self.store.store_settings(&settings)?;
        tracing::info!(index, "credential activated");
        Ok(settings)
    }

    pub fn active(&self) -> Result<Option<Credential>> {
        Ok(self.store.get_settings()?.credential)
    }

    pub fn logout(&mut self) -> Result<Option<Credential>> {
        let previous = self.active()?;
        self.store.store_settings(&Settings::default())?;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn registry_with(store: &mut InMemoryStore, names: &[&str]) {
        let mut registry = CredentialRegistry::new(store);
        for name in names {
            registry
                .add(name, &format!("secret-{}", name), CredentialKind::Standard)
                .unwrap();
        }
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut store = InMemoryStore::new();
        registry_with(&mut store, &["a", "b"]);
        let registry = CredentialRegistry::new(&mut store);
        let names: Vec<_> = registry.list_all().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.table().unwrap().resolve(2).unwrap().label, "b");
    }

    #[test]
    fn test_add_rejects_duplicates_and_empty() {
        let mut store = InMemoryStore::new();
        registry_with(&mut store, &["a"]);
        let mut registry = CredentialRegistry::new(&mut store);
        assert!(matches!(
            registry.add("a", "x", CredentialKind::Sandbox),
            Err(NoteError::DuplicateName(_))
        ));
        assert!(matches!(
            registry.add("", "x", CredentialKind::Standard),
            Err(NoteError::Validation(_))
        ));
        assert!(matches!(
            registry.add("b", "  ", CredentialKind::Standard),
            Err(NoteError::Validation(_))
        ));
    }

    #[test]
    fn test_activate_second_of_three() {
        let mut store = InMemoryStore::new();
        registry_with(&mut store, &["a", "b", "c"]);
        let mut registry = CredentialRegistry::new(&mut store);
        let settings = registry.activate_by_index(2).unwrap();
        assert_eq!(settings.api_key, "secret-b");
        assert_eq!(settings.credential.unwrap().name, "b");
        assert_eq!(store.get_settings().unwrap().api_key, "secret-b");
    }

    #[test]
    fn test_activate_out_of_range() {
        let mut store = InMemoryStore::new();
        registry_with(&mut store, &["a"]);
        let mut registry = CredentialRegistry::new(&mut store);
        assert!(matches!(registry.activate_by_index(2), Err(NoteError::NotFound(_))));
        assert!(matches!(registry.activate_by_index(0), Err(NoteError::NotFound(_))));
    }

    #[test]
    fn test_removing_other_credential_keeps_active() {
        let mut store = InMemoryStore::new();
        registry_with(&mut store, &["a", "b", "c"]);
        let mut registry = CredentialRegistry::new(&mut store);
        registry.activate_by_index(3).unwrap();
        registry.remove_by_index(1).unwrap();
        assert_eq!(registry.active().unwrap().unwrap().name, "c");
    }

    #[test]
    fn test_removing_active_credential_logs_out() {
        let mut store = InMemoryStore::new();
        registry_with(&mut store, &["a", "b"]);
        let mut registry = CredentialRegistry::new(&mut store);
        registry.activate_by_index(2).unwrap();
        registry.remove_by_index(2).unwrap();
        assert_eq!(store.get_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_remove_batch_shifts_correctly() {
        let mut store = InMemoryStore::new();
        registry_with(&mut store, &["a", "b", "c", "d"]);
        let mut registry = CredentialRegistry::new(&mut store);
        let outcome = registry
            .remove_batch(&BatchRequest::parse(&["4", "x", "2"]))
            .unwrap();
        assert_eq!(outcome.removed.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        let names: Vec<_> = registry.list_all().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_logout() {
        let mut store = InMemoryStore::new();
        registry_with(&mut store, &["a"]);
        let mut registry = CredentialRegistry::new(&mut store);
        registry.activate_by_index(1).unwrap();
        assert_eq!(registry.logout().unwrap().unwrap().name, "a");
        assert!(registry.active().unwrap().is_none());
    }
}
