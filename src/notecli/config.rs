use crate::error::{NoteError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_LIST_COUNT: usize = 20;

/// User configuration, stored as config.json next to the local store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoteConfig {
    /// Editor command, overriding $EDITOR and $VISUAL. May include arguments.
    #[serde(default)]
    pub editor: Option<String>,

    /// How many notes `note list` shows without `--count`.
    #[serde(default = "default_list_count")]
    pub list_count: usize,

    /// Where the local note service keeps its accounts.
    #[serde(default)]
    pub service_dir: Option<PathBuf>,
}

fn default_list_count() -> usize {
    DEFAULT_LIST_COUNT
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            editor: None,
            list_count: DEFAULT_LIST_COUNT,
            service_dir: None,
        }
    }
}

impl NoteConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(NoteError::Io)?;
        let config: NoteConfig =
            serde_json::from_str(&content).map_err(NoteError::Serialization)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = NoteConfig::default();
        assert_eq!(config.list_count, 20);
        assert!(config.editor.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(NoteConfig::load(dir.path()).unwrap(), NoteConfig::default());
    }

    #[test]
    fn test_load_full_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{"editor": "code --wait", "list_count": 5, "service_dir": "/srv/notes"}"#,
        )
        .unwrap();
        let config = NoteConfig::load(dir.path()).unwrap();
        assert_eq!(
            config,
            NoteConfig {
                editor: Some("code --wait".to_string()),
                list_count: 5,
                service_dir: Some(PathBuf::from("/srv/notes")),
            }
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "list_count = 5").unwrap();
        assert!(matches!(
            NoteConfig::load(dir.path()),
            Err(NoteError::Serialization(_))
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"editor": "vi"}"#).unwrap();
        let config = NoteConfig::load(dir.path()).unwrap();
        assert_eq!(config.editor.as_deref(), Some("vi"));
        assert_eq!(config.list_count, 20);
    }
}
