//! # Entity Index Table
//!
//! The note service keys everything by GUID, which nobody wants to type. Every
//! listing command therefore projects its ordered result onto a table of small,
//! 1-based indexes and persists that table through the Local Store, so that a
//! later `notecli note edit 3` can map `3` back to a GUID without re-fetching.
//!
//! ## Invariants
//!
//! - Indexes are unique and contiguous, starting at 1.
//! - They follow the listing's display order (notes: most recently modified
//!   first; credentials: insertion order).
//! - A table is only ever built from an ordered sequence ([`IndexTable::assign`]),
//!   never inferred from storage iteration order.
//!
//! ## Stale indexes
//!
//! A table lives until the next listing of the same kind replaces it. An index
//! typed after a *different* search resolves against the newest table and may
//! therefore point at another note than the one the user remembers. This is
//! accepted behavior, not an error.
//!
//! ## Selectors
//!
//! Commands that take one entity accept an index or a name ([`Selector`]).
//! Anything made only of digits is an index; prefix `=` to look up a name that
//! happens to be numeric.

use crate::error::{NoteError, Result};
use crate::model::Guid;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Note,
    Notebook,
    Credential,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Note => write!(f, "note"),
            EntityKind::Notebook => write!(f, "notebook"),
            EntityKind::Credential => write!(f, "credential"),
        }
    }
}

/// One row of a listing: the index the user sees and the identity behind it.
///
/// Credentials have no service GUID; their unique name is used as identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub index: usize,
    pub id: Guid,
    pub kind: EntityKind,
    /// Human-readable name (note title, notebook or credential name).
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTable {
    kind: EntityKind,
    entries: Vec<EntityRef>,
}

impl IndexTable {
    pub fn empty(kind: EntityKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Assigns indexes 1..=n to `ordered`, preserving its order.
    pub fn assign<I>(kind: EntityKind, ordered: I) -> Self
    where
        I: IntoIterator<Item = (Guid, String)>,
    {
        let entries = ordered
            .into_iter()
            .enumerate()
            .map(|(pos, (id, label))| EntityRef {
                index: pos + 1,
                id,
                kind,
                label,
            })
            .collect();
        Self { kind, entries }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[EntityRef] {
        &self.entries
    }

    /// Maps a 1-based index to its entity; fails outside `[1, len]`.
    pub fn resolve(&self, index: usize) -> Result<&EntityRef> {
        index
            .checked_sub(1)
            .and_then(|pos| self.entries.get(pos))
            .ok_or_else(|| NoteError::NotFound(format!("{} index {}", self.kind, index)))
    }

    /// Drops the entity at `index` and renumbers the entries after it, exactly
    /// as a fresh listing without that entity would.
    pub fn remove(&mut self, index: usize) -> Option<EntityRef> {
        let pos = index.checked_sub(1)?;
        if pos >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(pos);
        for entry in &mut self.entries[pos..] {
            entry.index -= 1;
        }
        Some(removed)
    }
}

/// A user input naming an entity, either by listing index or by name/title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Index(usize),
    Name(String),
}

impl Selector {
    /// Digits are an index. A leading `=` forces a name, so a note titled
    /// "2024" is selected with `=2024`.
    pub fn parse(input: &str) -> Self {
        if let Some(name) = input.strip_prefix('=') {
            return Selector::Name(name.to_string());
        }
        match parse_index(input) {
            Some(index) => Selector::Index(index),
            None => Selector::Name(input.to_string()),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(i) => write!(f, "{}", i),
            Selector::Name(n) => write!(f, "\"{}\"", n),
        }
    }
}

/// Parses a user-typed index. Only plain non-negative integers qualify.
pub fn parse_index(s: &str) -> Option<usize> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}
