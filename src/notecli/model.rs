use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An opaque identifier assigned by the note service.
///
/// Users never type these; they refer to entities through listing indexes
/// (see [`crate::index`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Absent until the note has been saved to the service once.
    pub guid: Option<Guid>,
    pub title: String,
    /// `None` means the service's default notebook.
    pub notebook: Option<Guid>,
    /// Service markup (ENML).
    pub content: String,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl Note {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            guid: None,
            title: title.into(),
            notebook: None,
            content: String::new(),
            created: None,
            updated: None,
        }
    }

    pub fn in_notebook(mut self, notebook: Option<Guid>) -> Self {
        self.notebook = notebook;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// The lightweight view of a note returned by searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub guid: Guid,
    pub title: String,
    pub notebook: Option<Guid>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    pub guid: Option<Guid>,
    pub name: String,
    pub stack: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl Notebook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            guid: None,
            name: name.into(),
            stack: None,
            is_default: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialKind {
    Standard,
    Sandbox,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::Standard => write!(f, "standard"),
            CredentialKind::Sandbox => write!(f, "sandbox"),
        }
    }
}

/// A stored access token. Its index is its position in the registry and is
/// not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub name: String,
    pub secret: String,
    pub kind: CredentialKind,
}

impl Credential {
    pub fn new(name: impl Into<String>, secret: impl Into<String>, kind: CredentialKind) -> Self {
        Self {
            name: name.into(),
            secret: secret.into(),
            kind,
        }
    }
}

/// The singleton settings record.
///
/// The active credential is held by value so that removing other credentials
/// never changes which one is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub credential: Option<Credential>,
}

impl Settings {
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some() && !self.api_key.is_empty()
    }
}
