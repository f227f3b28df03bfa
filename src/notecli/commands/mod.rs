use crate::model::{Credential, Note, NoteSummary, Notebook};

pub mod edit;
pub mod helpers;
pub mod note;
pub mod notebook;
pub mod user;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// A row of `note list`.
#[derive(Debug, Clone)]
pub struct ListedNote {
    pub index: usize,
    pub note: NoteSummary,
    pub notebook_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ListedNotebook {
    pub index: usize,
    pub notebook: Notebook,
}

#[derive(Debug, Clone)]
pub struct ListedCredential {
    pub index: usize,
    pub credential: Credential,
    pub active: bool,
}

/// A note prepared for display: `body` is Markdown, or the raw markup.
#[derive(Debug, Clone)]
pub struct NoteView {
    pub note: Note,
    pub notebook_name: Option<String>,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_notes: Vec<Note>,
    pub affected_notebooks: Vec<Notebook>,
    pub listed_notes: Vec<ListedNote>,
    pub listed_notebooks: Vec<ListedNotebook>,
    pub listed_credentials: Vec<ListedCredential>,
    pub viewed: Option<NoteView>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_notes(mut self, notes: Vec<Note>) -> Self {
        self.affected_notes = notes;
        self
    }

    pub fn with_affected_notebooks(mut self, notebooks: Vec<Notebook>) -> Self {
        self.affected_notebooks = notebooks;
        self
    }

    pub fn with_listed_notes(mut self, notes: Vec<ListedNote>) -> Self {
        self.listed_notes = notes;
        self
    }

    pub fn with_listed_notebooks(mut self, notebooks: Vec<ListedNotebook>) -> Self {
        self.listed_notebooks = notebooks;
        self
    }

    pub fn with_listed_credentials(mut self, credentials: Vec<ListedCredential>) -> Self {
        self.listed_credentials = credentials;
        self
    }

    pub fn with_viewed(mut self, view: NoteView) -> Self {
        self.viewed = Some(view);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.level == MessageLevel::Error)
            .count()
    }
}
