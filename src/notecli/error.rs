use std::fmt;
use thiserror::Error;

/// The stage of the edit life cycle at which an edit failed.
///
/// Every stage listed here happens after the recovery checkpoint was written,
/// so a failure at any of them leaves the checkpoint in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStage {
    Editor,
    Parse,
    Save,
}

impl fmt::Display for EditStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditStage::Editor => write!(f, "running the editor"),
            EditStage::Parse => write!(f, "reading the edited note"),
            EditStage::Save => write!(f, "saving the note"),
        }
    }
}

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("the name \"{0}\" is already taken")]
    DuplicateName(String),

    #[error("no recovery point available")]
    NoRecoveryPoint,

    #[error("note service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("editor failed: {0}")]
    EditorFailed(String),

    #[error("{0}")]
    Validation(String),

    #[error("could not write recovery checkpoint, edit aborted: {0}")]
    Checkpoint(String),

    #[error("edit failed while {stage}: {source}")]
    Edit {
        stage: EditStage,
        #[source]
        source: Box<NoteError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    /// Some entries of a batch failed; the others were applied.
    #[error("{0} of the requested entries could not be removed")]
    PartialFailure(usize),
}

impl NoteError {
    pub(crate) fn at_stage(stage: EditStage, source: NoteError) -> Self {
        NoteError::Edit {
            stage,
            source: Box::new(source),
        }
    }

    /// True when the failed operation left a checkpoint that `--recover` can resume.
    pub fn recovery_available(&self) -> bool {
        matches!(self, NoteError::Edit { .. })
    }
}

pub type Result<T> = std::result::Result<T, NoteError>;
