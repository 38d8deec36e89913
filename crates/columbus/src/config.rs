use std::path::{Path, PathBuf};

use applicant::Collections;
use backend::{BackendMode, BackendSettings};
use color_eyre::Result;
use settings::SettingsStore;

/// Settings file with the `backend` and `collections` sections registered.
pub struct Config {
    store: SettingsStore,
}

impl Config {
    pub fn open(settings_file: impl Into<PathBuf>) -> Result<Self> {
        let store = SettingsStore::builder()
            .with_settings_file(settings_file)
            .build()?;
        store.register::<BackendSettings>()?;
        store.register::<Collections>()?;
        Ok(Self { store })
    }

    pub fn file_path(&self) -> &Path {
        self.store.file_path()
    }

    /// Stored backend settings, without environment overrides.
    pub fn stored_backend(&self) -> Result<BackendSettings> {
        Ok(BackendSettings::clone(&*self.store.get::<BackendSettings>()?))
    }

    /// Backend settings as used for connecting.
    pub fn backend(&self) -> Result<BackendSettings> {
        Ok(self.stored_backend()?.with_env_overrides())
    }

    pub fn collections(&self) -> Result<Collections> {
        Ok(Collections::clone(&*self.store.get::<Collections>()?))
    }

    pub fn use_local(&self) -> Result<()> {
        self.store
            .update::<BackendSettings, _>(|backend| backend.mode = BackendMode::Local)?;
        Ok(())
    }

    /// Switch to the managed backend. Options left out keep their stored value.
    pub fn use_remote(&self, project: Option<String>, api_key: Option<String>) -> Result<()> {
        self.store.update::<BackendSettings, _>(|backend| {
            backend.mode = BackendMode::Remote;
            if let Some(project) = project {
                backend.project_id = project;
            }
            if let Some(api_key) = api_key {
                backend.api_key = api_key;
            }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn switching_modes_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("columbus.settings.ron");

        let config = Config::open(&path).unwrap();
        assert_eq!(config.stored_backend().unwrap().mode, BackendMode::Local);
        config
            .use_remote(Some("columbus-wt".into()), None)
            .unwrap();

        let reopened = Config::open(&path).unwrap();
        let backend = reopened.stored_backend().unwrap();
        assert_eq!(backend.mode, BackendMode::Remote);
        assert_eq!(backend.project_id, "columbus-wt");
        assert_eq!(reopened.collections().unwrap(), Collections::default());

        reopened.use_local().unwrap();
        let backend = Config::open(&path).unwrap().stored_backend().unwrap();
        assert_eq!(backend.mode, BackendMode::Local);
        assert_eq!(backend.project_id, "columbus-wt");
    }
}
