//! # Batch Index Resolver
//!
//! Removing the entity at index *k* shifts every later entity down by one, so
//! `notecli user remove 1 3` cannot simply remove `1` and then `3`: after the
//! first removal, `3` names what used to be `4`.
//!
//! The resolver sorts the requested indexes ascending, de-duplicates them, and
//! walks them while counting successful removals. Each original index is
//! looked up at `original - removed` in the *current* table. Because the walk
//! is ascending, every earlier success sits before the next target, so the
//! adjustment is exact.
//!
//! Inputs that are not integers are reported and skipped. Indexes that fall
//! outside the table, and removals that fail, are reported individually and do
//! not abort the rest of the batch. A failed removal does not count towards
//! the adjustment, since the entity is still in the table.

use crate::error::{NoteError, Result};
use crate::index::{parse_index, EntityRef, IndexTable};
use crate::model::Guid;
use std::fmt;

/// User input split into usable indexes (sorted, unique) and rejected words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRequest {
    pub indexes: Vec<usize>,
    pub rejected: Vec<String>,
}

impl BatchRequest {
    pub fn parse<I: AsRef<str>>(raw: &[I]) -> Self {
        let mut request = BatchRequest::default();
        for input in raw {
            let input = input.as_ref();
            match parse_index(input) {
                Some(index) => request.indexes.push(index),
                None => {
                    tracing::warn!(input, "skipping non-numeric index");
                    request.rejected.push(input.to_string());
                }
            }
        }
        request.indexes.sort_unstable();
        request.indexes.dedup();
        request
    }
}

/// A successful removal: the index the user typed and the entity it named.
///
/// `entity.index` is the adjusted position the entity had when it was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub original: usize,
    pub entity: EntityRef,
}

#[derive(Debug)]
pub enum BatchFailure {
    NotANumber(String),
    OutOfRange(usize),
    Failed { index: usize, error: NoteError },
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchFailure::NotANumber(input) => write!(f, "{} is not a number, skipping", input),
            BatchFailure::OutOfRange(index) => write!(f, "index {} is out of range", index),
            BatchFailure::Failed { index, error } => {
                write!(f, "error when removing entry {}: {}", index, error)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub removed: Vec<Removal>,
    pub failures: Vec<BatchFailure>,
}

/// Runs `remove` for every requested index in shift-safe order.
///
/// `remove` receives the entity with its *current* index, so callers backed by
/// a positional collection (the credential registry) can remove by that index
/// directly. On success the entity is dropped from `table` as well.
pub fn remove_in_order<F>(table: &mut IndexTable, request: &BatchRequest, mut remove: F) -> BatchOutcome
where
    F: FnMut(&EntityRef) -> Result<()>,
{
    let mut outcome = BatchOutcome {
        failures: request
            .rejected
            .iter()
            .cloned()
            .map(BatchFailure::NotANumber)
            .collect(),
        ..BatchOutcome::default()
    };
    let mut removed_count = 0;

    for &original in &request.indexes {
        let entity = match original
            .checked_sub(removed_count)
            .and_then(|adjusted| table.resolve(adjusted).ok())
        {
            Some(entity) => entity.clone(),
            None => {
                tracing::warn!(index = original, "batch index out of range");
                outcome.failures.push(BatchFailure::OutOfRange(original));
                continue;
            }
        };

        match remove(&entity) {
            Ok(()) => {
                table.remove(entity.index);
                removed_count += 1;
                tracing::debug!(original, adjusted = entity.index, id = %entity.id, "removed");
                outcome.removed.push(Removal { original, entity });
            }
            Err(error) => {
                tracing::warn!(index = original, %error, "batch removal failed");
                outcome
                    .failures
                    .push(BatchFailure::Failed { index: original, error });
            }
        }
    }

    outcome
}

/// Computes, without side effects, which identifier each requested index will
/// remove and in which order, assuming every removal succeeds.
pub fn resolve_and_order(table: &IndexTable, indexes: &[usize]) -> Vec<(usize, Guid)> {
    let mut scratch = table.clone();
    let mut sorted = indexes.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let request = BatchRequest {
        indexes: sorted,
        rejected: Vec::new(),
    };
    remove_in_order(&mut scratch, &request, |_| Ok(()))
        .removed
        .into_iter()
        .map(|r| (r.original, r.entity.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::EntityKind;

    fn table(n: usize) -> IndexTable {
        IndexTable::assign(
            EntityKind::Note,
            (1..=n).map(|i| (Guid::from(format!("g{}", i)), format!("Note {}", i))),
        )
    }

    fn ids(pairs: &[(usize, Guid)]) -> Vec<String> {
        pairs.iter().map(|(_, g)| g.to_string()).collect()
    }

    #[test]
    fn test_parse_sorts_dedups_and_rejects() {
        let req = BatchRequest::parse(&["3", "x", "1", "3", "-2"]);
        assert_eq!(req.indexes, vec![1, 3]);
        assert_eq!(req.rejected, vec!["x".to_string(), "-2".to_string()]);
    }

    #[test]
    fn test_unsorted_request_removes_original_entities() {
        // Listing of three; user asks for 3 and 1.
        let mut t = table(3);
        let req = BatchRequest::parse(&["3", "1"]);
        let mut calls = Vec::new();
        let outcome = remove_in_order(&mut t, &req, |e| {
            calls.push((e.index, e.id.to_string()));
            Ok(())
        });

        // 1 goes first, then "3" is looked up at position 2 of the shrunken table.
        assert_eq!(calls, vec![(1, "g1".to_string()), (2, "g3".to_string())]);
        assert_eq!(outcome.removed.len(), 2);
        assert_eq!(outcome.removed[1].original, 3);
        assert_eq!(t.len(), 1);
        assert_eq!(t.resolve(1).unwrap().id, Guid::from("g2"));
    }

    #[test]
    fn test_resolve_and_order_matches_pre_removal_table_for_all_subsets() {
        let n = 6;
        let t = table(n);
        for mask in 1u32..(1 << n) {
            let chosen: Vec<usize> = (1..=n).filter(|i| mask & (1 << (i - 1)) != 0).collect();
            let mut requested = chosen.clone();
            requested.reverse();
            let plan = resolve_and_order(&t, &requested);
            let expected: Vec<String> = chosen.iter().map(|i| format!("g{}", i)).collect();
            assert_eq!(ids(&plan), expected, "subset {:?}", chosen);
        }
    }

    #[test]
    fn test_out_of_range_does_not_abort_batch() {
        let mut t = table(2);
        let req = BatchRequest::parse(&["1", "5", "2"]);
        let outcome = remove_in_order(&mut t, &req, |_| Ok(()));
        assert_eq!(outcome.removed.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(outcome.failures[0], BatchFailure::OutOfRange(5)));
        assert!(t.is_empty());
    }

    #[test]
    fn test_failed_removal_does_not_shift_later_indexes() {
        let mut t = table(3);
        let req = BatchRequest::parse(&["1", "2", "3"]);
        let outcome = remove_in_order(&mut t, &req, |e| {
            if e.id == Guid::from("g2") {
                Err(NoteError::RemoteUnavailable("offline".into()))
            } else {
                Ok(())
            }
        });
        let removed: Vec<String> = outcome
            .removed
            .iter()
            .map(|r| r.entity.id.to_string())
            .collect();
        assert_eq!(removed, vec!["g1", "g3"]);
        assert!(matches!(
            outcome.failures[0],
            BatchFailure::Failed { index: 2, .. }
        ));
        assert_eq!(t.len(), 1);
        assert_eq!(t.resolve(1).unwrap().id, Guid::from("g2"));
    }

    #[test]
    fn test_not_a_number_reported_as_failure() {
        let mut t = table(1);
        let req = BatchRequest::parse(&["one"]);
        let outcome = remove_in_order(&mut t, &req, |_| Ok(()));
        assert!(outcome.removed.is_empty());
        assert_eq!(
            outcome.failures[0].to_string(),
            "one is not a number, skipping"
        );
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_zero_index_is_out_of_range() {
        let mut t = table(2);
        let req = BatchRequest::parse(&["0", "2"]);
        let outcome = remove_in_order(&mut t, &req, |_| Ok(()));
        assert!(matches!(outcome.failures[0], BatchFailure::OutOfRange(0)));
        assert_eq!(outcome.removed[0].entity.id, Guid::from("g2"));
    }
}
