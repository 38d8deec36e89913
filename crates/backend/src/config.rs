use std::path::Path;
use std::sync::Arc;

use applicant::{IdentityProvider, RecordStore};
use serde::{Deserialize, Serialize};
use settings::Settings;
use strum::{AsRefStr, Display, EnumString};
use tracing::info;

use crate::error::BackendError;
use crate::memory::MemoryBackend;
use crate::rest::RestBackend;

/// Environment variable that overrides `backend.api_key`.
pub const API_KEY_ENV: &str = "COLUMBUS_API_KEY";

/// Which collaborators to talk to.
///
/// Stored as a plain string so the settings file reads `mode: "remote"`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(into = "String", try_from = "String")]
pub enum BackendMode {
    /// In-process store, snapshotted under the data directory.
    #[default]
    Local,
    /// The managed backend.
    Remote,
}

impl From<BackendMode> for String {
    fn from(mode: BackendMode) -> Self {
        mode.as_ref().to_string()
    }
}

impl TryFrom<String> for BackendMode {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub mode: BackendMode,
    pub project_id: String,
    pub api_key: String,
    pub identity_endpoint: String,
    pub token_endpoint: String,
    pub firestore_endpoint: String,
    pub database: String,
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            mode: BackendMode::Local,
            project_id: String::new(),
            api_key: String::new(),
            identity_endpoint: "https://identitytoolkit.googleapis.com/v1".into(),
            token_endpoint: "https://securetoken.googleapis.com/v1".into(),
            firestore_endpoint: "https://firestore.googleapis.com/v1".into(),
            database: "(default)".into(),
            timeout_secs: 15,
        }
    }
}

impl Settings for BackendSettings {
    const SECTION: &'static str = "backend";
}

impl BackendSettings {
    /// Replace the API key when an override is present and non-empty.
    pub fn with_api_key_override(mut self, api_key: Option<String>) -> Self {
        if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
            self.api_key = key;
        }
        self
    }

    /// Apply [`API_KEY_ENV`] from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    /// Build the collaborators for the configured mode.
    ///
    /// `local_store` is the snapshot file of the local mode; `None` keeps the
    /// local store in memory only.
    pub fn connect(&self, local_store: Option<&Path>) -> Result<Backend, BackendError> {
        match self.mode {
            BackendMode::Local => {
                let memory = match local_store {
                    Some(path) => MemoryBackend::open(path)?,
                    None => MemoryBackend::new(),
                };
                info!(snapshot = ?local_store, "using local backend");
                Ok(Backend::shared(Arc::new(memory)))
            }
            BackendMode::Remote => {
                let rest = RestBackend::new(self)?;
                info!(project = %self.project_id, "using remote backend");
                Ok(Backend::shared(Arc::new(rest)))
            }
        }
    }
}

/// The two collaborators, usually backed by one object.
#[derive(Clone)]
pub struct Backend {
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn RecordStore>,
}

impl Backend {
    pub fn shared<T>(backend: Arc<T>) -> Self
    where
        T: IdentityProvider + RecordStore + 'static,
    {
        Self {
            identity: backend.clone(),
            store: backend,
        }
    }
}
