//! # Edit Orchestrator
//!
//! Drives one edit from start to finish:
//!
//! 1. Build the buffer: from the recovery checkpoint (`--recover`), from the
//!    note fetched from the service, or a blank one for a new note. Unless the
//!    edit is raw, the note markup goes through the [`ContentCodec`].
//! 2. Write the checkpoint. If that fails, stop before the editor runs.
//! 3. Run the editor and wait for it.
//! 4. Empty or unchanged buffers are not saved and the checkpoint stays.
//!    Otherwise the checkpoint is rewritten with the edited buffer.
//! 5. Split the buffer into title and body (not for raw edits).
//! 6. Create or update the note on the service.
//! 7. Clear the checkpoint.
//!
//! Failures in steps 3 to 6 come back as [`NoteError::Edit`] with the stage
//! that failed. The checkpoint is left in place for `--recover`.

use super::{CmdMessage, CmdResult};
use crate::checkpoint::{Checkpoint, CheckpointManager, CheckpointTarget, EditOptions};
use crate::codec::{empty_note, ContentCodec};
use crate::editor::{edit_buffer, EditorContent, EditorLauncher};
use crate::error::{EditStage, NoteError, Result};
use crate::model::{Guid, Note};
use crate::service::NoteService;
use crate::store::LocalStore;

pub const UNTITLED: &str = "Untitled note";

/// What to edit when not resuming from the checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Existing(Guid),
    New {
        title: String,
        notebook: Option<Guid>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Empty,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Saved(Note),
    /// Nothing was sent to the service; the checkpoint was kept.
    Skipped(SkipReason),
}

pub fn edit<S: LocalStore, R: NoteService>(
    store: &mut S,
    service: &mut R,
    codec: &dyn ContentCodec,
    editor: &dyn EditorLauncher,
    target: Option<EditTarget>,
    options: EditOptions,
) -> Result<EditOutcome> {
    let mut checkpoints = CheckpointManager::new(store);

    let (checkpoint, recovering) = if options.use_recovery_point {
        let checkpoint = checkpoints.read()?;
        tracing::info!(edit_target = ?checkpoint.target, saved_at = %checkpoint.saved_at, "resuming from recovery point");
        (checkpoint, true)
    } else {
        let target = target.ok_or_else(|| NoteError::Validation("no note to edit".into()))?;
        (prepare(service, codec, target, options)?, false)
    };

    checkpoints.write(&checkpoint)?;

    let raw = checkpoint.options.raw;
    let suffix = if raw { ".enml" } else { ".md" };
    let edited = edit_buffer(editor, &checkpoint.content, suffix)
        .map_err(|e| NoteError::at_stage(EditStage::Editor, e))?;

    if edited.trim().is_empty() {
        tracing::warn!("edited note is empty, keeping recovery point");
        return Ok(EditOutcome::Skipped(SkipReason::Empty));
    }
    if !recovering && edited == checkpoint.content {
        tracing::debug!("note unchanged, keeping recovery point");
        return Ok(EditOutcome::Skipped(SkipReason::Unchanged));
    }

    let checkpoint = match checkpoints.update_content(&checkpoint, &edited) {
        Ok(updated) => updated,
        Err(error) => {
            // The buffer handed to the editor is still checkpointed.
            tracing::warn!(%error, "could not checkpoint the edited note");
            let mut updated = checkpoint.clone();
            updated.content = edited;
            updated
        }
    };

    let note = parse(codec, &checkpoint).map_err(|e| NoteError::at_stage(EditStage::Parse, e))?;

    let saved = match &checkpoint.target {
        CheckpointTarget::Existing(guid) => service.update_note(guid, &note),
        CheckpointTarget::New => service.create_note(&note),
    }
    .map_err(|e| NoteError::at_stage(EditStage::Save, e))?;

    if let Err(error) = checkpoints.clear() {
        tracing::warn!(%error, "note saved but the recovery point could not be cleared");
    }
    Ok(EditOutcome::Saved(saved))
}

/// Fetches or creates the content to edit and wraps it in a checkpoint.
fn prepare<R: NoteService>(
    service: &R,
    codec: &dyn ContentCodec,
    target: EditTarget,
    options: EditOptions,
) -> Result<Checkpoint> {
    match target {
        EditTarget::Existing(guid) => {
            let note = service.get_note(&guid)?;
            let buffer = if options.raw {
                note.content.clone()
            } else {
                EditorContent::new(note.title.clone(), codec.to_editable(&note.content)?).to_buffer()
            };
            Ok(Checkpoint::new(CheckpointTarget::Existing(guid), buffer, options)
                .with_title(note.title)
                .with_notebook(note.notebook))
        }
        EditTarget::New { title, notebook } => {
            let buffer = if options.raw {
                empty_note()
            } else {
                EditorContent::new(title.clone(), "").to_buffer()
            };
            Ok(Checkpoint::new(CheckpointTarget::New, buffer, options)
                .with_title(title)
                .with_notebook(notebook))
        }
    }
}

/// Turns the checkpointed buffer into the note to push.
fn parse(codec: &dyn ContentCodec, checkpoint: &Checkpoint) -> Result<Note> {
    let (title, content) = if checkpoint.options.raw {
        if !checkpoint.content.contains("<en-note") {
            return Err(NoteError::Validation(
                "raw content must be an <en-note> document".into(),
            ));
        }
        (checkpoint.title.clone(), checkpoint.content.clone())
    } else {
        let parsed = EditorContent::from_buffer(&checkpoint.content);
        (parsed.title, codec.from_editable(&parsed.body))
    };

    let title = if title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        title
    };
    Ok(Note::new(title)
        .in_notebook(checkpoint.notebook.clone())
        .with_content(content))
}

pub fn run<S: LocalStore, R: NoteService>(
    store: &mut S,
    service: &mut R,
    codec: &dyn ContentCodec,
    editor: &dyn EditorLauncher,
    target: Option<EditTarget>,
    options: EditOptions,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let replacing = !options.use_recovery_point && CheckpointManager::new(store).exists()?;
    if replacing {
        tracing::warn!("an unrecovered edit is being replaced");
    }
    match edit(store, service, codec, editor, target, options)? {
        EditOutcome::Saved(note) => {
            result.add_message(CmdMessage::success(format!("Note \"{}\" saved", note.title)));
            result.affected_notes.push(note);
        }
        EditOutcome::Skipped(reason) => {
            let what = match reason {
                SkipReason::Empty => "Note is empty",
                SkipReason::Unchanged => "Note unchanged",
            };
            result.add_message(CmdMessage::warning(format!("{}, nothing saved", what)));
        }
    }
    if replacing {
        result.add_message(CmdMessage::warning(
            "An earlier unsaved edit was discarded; it could have been resumed with --recover",
        ));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MarkdownCodec;
    use crate::service::memory::InMemoryService;
    use crate::store::memory::InMemoryStore;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;

    /// Editor double: records what it was given and writes `reply`, or fails.
    struct Scripted {
        reply: Option<String>,
        seen: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn writes(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn killed() -> Self {
            Self {
                reply: None,
                seen: RefCell::new(Vec::new()),
            }
        }

        fn last_seen(&self) -> String {
            self.seen.borrow().last().cloned().unwrap_or_default()
        }
    }

    impl EditorLauncher for Scripted {
        fn open(&self, path: &Path) -> Result<()> {
            self.seen.borrow_mut().push(fs::read_to_string(path)?);
            match &self.reply {
                Some(reply) => {
                    fs::write(path, reply)?;
                    Ok(())
                }
                None => Err(NoteError::EditorFailed("terminated by signal".into())),
            }
        }
    }

    fn new_target(title: &str) -> Option<EditTarget> {
        Some(EditTarget::New {
            title: title.to_string(),
            notebook: None,
        })
    }

    fn existing(service: &mut InMemoryService, title: &str, markdown: &str) -> Guid {
        let note = Note::new(title).with_content(MarkdownCodec.from_editable(markdown));
        service.create_note(&note).unwrap().guid.unwrap()
    }

    #[test]
    fn test_edit_existing_note_saves_and_clears() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let guid = existing(&mut service, "Groceries", "milk\n");
        let editor = Scripted::writes("Groceries\n\nmilk and *eggs*\n");

        let outcome = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &editor,
            Some(EditTarget::Existing(guid.clone())),
            EditOptions::default(),
        )
        .unwrap();

        assert!(matches!(outcome, EditOutcome::Saved(_)));
        assert_eq!(editor.last_seen(), "Groceries\n\nmilk");
        let note = service.get_note(&guid).unwrap();
        assert!(note.content.contains("<em>eggs</em>"));
        assert!(store.read_checkpoint().unwrap().is_none());
    }

    #[test]
    fn test_new_edit_warns_about_discarded_checkpoint() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let codec = MarkdownCodec;
        run(
            &mut store,
            &mut service,
            &codec,
            &Scripted::killed(),
            new_target("Lost"),
            EditOptions::default(),
        )
        .unwrap_err();

        let result = run(
            &mut store,
            &mut service,
            &codec,
            &Scripted::writes("Kept\n\nbody"),
            new_target("Kept"),
            EditOptions::default(),
        )
        .unwrap();
        assert!(result
            .messages
            .iter()
            .any(|m| m.level == crate::commands::MessageLevel::Warning && m.content.contains("--recover")));

        let result = run(
            &mut store,
            &mut service,
            &codec,
            &Scripted::writes("Fresh\n\nbody"),
            new_target("Fresh"),
            EditOptions::default(),
        )
        .unwrap();
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn test_new_note_gets_created() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let editor = Scripted::writes("Ideas\n\n- one\n- two\n");

        let outcome = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &editor,
            new_target("Ideas"),
            EditOptions::default(),
        )
        .unwrap();

        let EditOutcome::Saved(note) = outcome else {
            panic!("expected a saved note");
        };
        assert_eq!(note.title, "Ideas");
        assert!(note.content.contains("<li>one</li>"));
        assert_eq!(editor.last_seen(), "Ideas\n\n");
        assert_eq!(service.note_count(), 1);
    }

    #[test]
    fn test_editor_failure_keeps_checkpoint() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let guid = existing(&mut service, "Journal", "day one\n");

        let err = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &Scripted::killed(),
            Some(EditTarget::Existing(guid.clone())),
            EditOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            NoteError::Edit {
                stage: EditStage::Editor,
                ..
            }
        ));
        assert!(err.recovery_available());
        let cp = store.read_checkpoint().unwrap().unwrap();
        assert_eq!(cp.content, "Journal\n\nday one");
        assert_eq!(cp.target, CheckpointTarget::Existing(guid));
    }

    #[test]
    fn test_recover_after_killed_editor() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let guid = existing(&mut service, "Journal", "day one\n");

        let _ = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &Scripted::killed(),
            Some(EditTarget::Existing(guid.clone())),
            EditOptions::default(),
        );

        // The service copy changes meanwhile; recovery must not refetch it.
        service
            .update_note(&guid, &Note::new("Other").with_content("<en-note>x</en-note>"))
            .unwrap();

        let editor = Scripted::writes("Journal\n\nday one\n\nday two\n");
        let outcome = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &editor,
            None,
            EditOptions::default().recover(true),
        )
        .unwrap();

        assert!(matches!(outcome, EditOutcome::Saved(_)));
        assert_eq!(editor.last_seen(), "Journal\n\nday one");
        let note = service.get_note(&guid).unwrap();
        assert_eq!(note.title, "Journal");
        assert!(note.content.contains("day two"));
        assert!(store.read_checkpoint().unwrap().is_none());
    }

    #[test]
    fn test_recover_without_checkpoint() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let err = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &Scripted::writes("x"),
            None,
            EditOptions::default().recover(true),
        )
        .unwrap_err();
        assert!(matches!(err, NoteError::NoRecoveryPoint));
    }

    #[test]
    fn test_failed_save_keeps_edited_content() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        service.set_offline(true);

        let err = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &Scripted::writes("Draft\n\nimportant words"),
            new_target("Draft"),
            EditOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            NoteError::Edit {
                stage: EditStage::Save,
                ..
            }
        ));
        let cp = store.read_checkpoint().unwrap().unwrap();
        assert_eq!(cp.content, "Draft\n\nimportant words");
        assert_eq!(cp.target, CheckpointTarget::New);

        // Back online, recovering saves exactly once.
        service.set_offline(false);
        let editor = Scripted::writes("Draft\n\nimportant words");
        edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &editor,
            None,
            EditOptions::default().recover(true),
        )
        .unwrap();
        assert_eq!(editor.last_seen(), "Draft\n\nimportant words");
        assert_eq!(service.note_count(), 1);
        assert!(store.read_checkpoint().unwrap().is_none());
    }

    #[test]
    fn test_checkpoint_failure_aborts_before_editor() {
        let mut store = InMemoryStore::new().with_failing_checkpoints();
        let mut service = InMemoryService::new();
        let editor = Scripted::writes("x\n\ny");

        let err = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &editor,
            new_target("x"),
            EditOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, NoteError::Checkpoint(_)));
        assert!(!err.recovery_available());
        assert!(editor.seen.borrow().is_empty());
        assert_eq!(service.note_count(), 0);
    }

    #[test]
    fn test_fetch_failure_writes_no_checkpoint() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let guid = existing(&mut service, "a", "b");
        service.set_offline(true);

        let err = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &Scripted::writes("x"),
            Some(EditTarget::Existing(guid)),
            EditOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, NoteError::RemoteUnavailable(_)));
        assert!(store.read_checkpoint().unwrap().is_none());
    }

    #[test]
    fn test_unchanged_buffer_skips_save() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let guid = existing(&mut service, "Same", "text\n");
        service.set_read_only(true);

        let outcome = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &Scripted::writes("Same\n\ntext"),
            Some(EditTarget::Existing(guid)),
            EditOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome, EditOutcome::Skipped(SkipReason::Unchanged));
        assert!(store.read_checkpoint().unwrap().is_some());
    }

    #[test]
    fn test_empty_buffer_skips_save_and_keeps_original_checkpoint() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let guid = existing(&mut service, "Keep", "me\n");

        let outcome = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &Scripted::writes("\n  \n"),
            Some(EditTarget::Existing(guid)),
            EditOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome, EditOutcome::Skipped(SkipReason::Empty));
        assert_eq!(store.read_checkpoint().unwrap().unwrap().content, "Keep\n\nme");
    }

    #[test]
    fn test_raw_edit_passes_markup_through() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let guid = existing(&mut service, "Raw", "plain\n");
        let original = service.get_note(&guid).unwrap().content;
        let replacement = original.replace("plain", "<b>bold</b> plain");
        let editor = Scripted::writes(&replacement);

        edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &editor,
            Some(EditTarget::Existing(guid.clone())),
            EditOptions::default().raw(true),
        )
        .unwrap();

        assert_eq!(editor.last_seen(), original);
        let note = service.get_note(&guid).unwrap();
        assert_eq!(note.content, replacement);
        assert_eq!(note.title, "Raw");
    }

    #[test]
    fn test_raw_edit_rejects_non_enml() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();

        let err = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &Scripted::writes("just text"),
            new_target("T"),
            EditOptions::default().raw(true),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            NoteError::Edit {
                stage: EditStage::Parse,
                ..
            }
        ));
        assert_eq!(store.read_checkpoint().unwrap().unwrap().content, "just text");
    }

    #[test]
    fn test_blank_title_becomes_untitled() {
        let mut store = InMemoryStore::new();
        let mut service = InMemoryService::new();
        let outcome = edit(
            &mut store,
            &mut service,
            &MarkdownCodec,
            &Scripted::writes("\n\nbody only"),
            new_target(""),
            EditOptions::default(),
        )
        .unwrap();
        let EditOutcome::Saved(note) = outcome else {
            panic!("expected a saved note");
        };
        assert_eq!(note.title, UNTITLED);
    }
}
