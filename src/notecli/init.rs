use crate::api::{NoteApi, UserApi};
use crate::config::NoteConfig;
use crate::error::{NoteError, Result};
use crate::service::fs::FileService;
use crate::store::fs::FileStore;
use crate::store::LocalStore;
use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;

/// Overrides every notecli directory: `$NOTECLI_HOME/store` and `$NOTECLI_HOME/service`.
pub const HOME_ENV: &str = "NOTECLI_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePaths {
    /// Local store and config.json.
    pub store: PathBuf,
    /// Accounts of the local note service.
    pub service: PathBuf,
}

impl NotePaths {
    /// `home` (normally `$NOTECLI_HOME`) wins; otherwise the platform config
    /// and data directories are used.
    pub fn resolve(home: Option<PathBuf>) -> Result<Self> {
        if let Some(home) = home {
            return Ok(Self {
                store: home.join("store"),
                service: home.join("service"),
            });
        }
        let dirs = ProjectDirs::from("com", "notecli", "notecli").ok_or_else(|| {
            NoteError::Store(format!(
                "could not determine a home directory, set {}",
                HOME_ENV
            ))
        })?;
        Ok(Self {
            store: dirs.config_dir().to_path_buf(),
            service: dirs.data_dir().join("service"),
        })
    }
}

pub struct NoteContext {
    pub paths: NotePaths,
    pub config: NoteConfig,
}

impl NoteContext {
    pub fn store(&self) -> FileStore {
        FileStore::new(self.paths.store.clone())
    }

    pub fn user_api(&self) -> UserApi<FileStore> {
        UserApi::new(self.store())
    }

    /// Connects to the service with the active credential.
    pub fn note_api(&self) -> Result<NoteApi<FileStore, FileService>> {
        let store = self.store();
        let settings = store.get_settings()?;
        let service = FileService::connect(&self.paths.service, &settings)?;
        Ok(NoteApi::new(store, service))
    }
}

pub fn initialize() -> Result<NoteContext> {
    let home = env::var_os(HOME_ENV)
        .filter(|h| !h.is_empty())
        .map(PathBuf::from);
    let overridden = home.is_some();
    let mut paths = NotePaths::resolve(home)?;
    let config = NoteConfig::load(&paths.store)?;
    // $NOTECLI_HOME beats the service_dir option.
    if let (false, Some(dir)) = (overridden, &config.service_dir) {
        paths.service = dir.clone();
    }
    tracing::debug!(store = %paths.store.display(), service = %paths.service.display(), "paths resolved");
    Ok(NoteContext { paths, config })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_home_override() {
        let dir = TempDir::new().unwrap();
        let paths = NotePaths::resolve(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(paths.store, dir.path().join("store"));
        assert_eq!(paths.service, dir.path().join("service"));
    }

    #[test]
    fn test_note_api_needs_login() {
        let dir = TempDir::new().unwrap();
        let context = NoteContext {
            paths: NotePaths::resolve(Some(dir.path().to_path_buf())).unwrap(),
            config: NoteConfig::default(),
        };
        assert!(matches!(
            context.note_api(),
            Err(NoteError::RemoteUnavailable(_))
        ));
    }
}
