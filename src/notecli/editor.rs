use crate::error::{NoteError, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Represents the content of an editor buffer.
/// Format: title\n\nbody
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContent {
    pub title: String,
    pub body: String,
}

impl EditorContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn to_buffer(&self) -> String {
        format!("{}\n\n{}", self.title, self.body)
    }

    /// First line is the title, the rest (minus leading blank lines) the body.
    pub fn from_buffer(buffer: &str) -> Self {
        let (title, rest) = match buffer.split_once('\n') {
            Some((title, rest)) => (title, rest),
            None => (buffer, ""),
        };
        Self {
            title: title.trim().to_string(),
            body: rest.trim_start_matches(['\n', '\r']).trim_end().to_string(),
        }
    }
}

/// Launches an editor on a file and blocks until it exits.
pub trait EditorLauncher {
    fn open(&self, path: &Path) -> Result<()>;
}

/// The user's editor, run as a child process.
#[derive(Debug, Clone)]
pub struct SystemEditor {
    command: String,
}

impl SystemEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Resolves the editor from `configured`, `$EDITOR`, `$VISUAL`, then
    /// common editors on the `PATH`.
    pub fn detect(configured: Option<&str>) -> Result<Self> {
        get_editor(configured).map(Self::new)
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl EditorLauncher for SystemEditor {
    fn open(&self, path: &Path) -> Result<()> {
        // The command may carry arguments, e.g. "code --wait".
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| NoteError::EditorFailed("empty editor command".to_string()))?;

        tracing::debug!(editor = %self.command, path = %path.display(), "launching editor");
        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .map_err(|e| {
                NoteError::EditorFailed(format!("failed to launch '{}': {}", self.command, e))
            })?;

        if !status.success() {
            return Err(NoteError::EditorFailed(format!(
                "'{}' exited with {}",
                self.command, status
            )));
        }
        Ok(())
    }
}

/// Gets the editor command.
/// Checks the configured editor, $EDITOR, then $VISUAL, then falls back to common editors.
pub fn get_editor(configured: Option<&str>) -> Result<String> {
    if let Some(editor) = configured.filter(|e| !e.trim().is_empty()) {
        return Ok(editor.to_string());
    }

    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(editor);
            }
        }
    }

    for fallback in &["vim", "vi", "nano"] {
        if Command::new("which")
            .arg(fallback)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
        {
            return Ok((*fallback).to_string());
        }
    }

    Err(NoteError::EditorFailed(
        "no editor found, set $EDITOR or the editor config option".to_string(),
    ))
}

/// Hands `content` to the editor in a temp file with `suffix` and returns
/// what the file holds once the editor exits.
pub fn edit_buffer(launcher: &dyn EditorLauncher, content: &str, suffix: &str) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("notecli-")
        .suffix(suffix)
        .tempfile()
        .map_err(|e| NoteError::EditorFailed(format!("could not create temp file: {}", e)))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| NoteError::EditorFailed(format!("could not write temp file: {}", e)))?;

    launcher.open(file.path())?;

    fs::read_to_string(file.path())
        .map_err(|e| NoteError::EditorFailed(format!("could not read edited file: {}", e)))
}
