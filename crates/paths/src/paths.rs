//! Path context for runtime environment detection and project-aware paths.
//!
//! Every file the client touches on disk (settings, the persisted session,
//! the local record snapshot, log files) is resolved through [`PathContext`]
//! so tests can point the whole tree at a temporary directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identifies the runtime environment where the application is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// Running via `cargo run` or in development mode
    Development,
    /// Running as an installed binary
    Production,
}

/// Context for managing application paths based on a studio/project/app structure.
#[derive(Debug, Clone)]
pub struct PathContext {
    environment: RuntimeEnvironment,
    base_path: Arc<Path>,
    /// Organisation identifier (e.g., "columbus")
    studio: String,
    /// Project identifier (e.g., "work_and_travel")
    project_id: String,
    /// Application identifier (e.g., "columbus-cli")
    app_id: &'static str,
}

impl PathContext {
    /// Creates a new PathContext with automatic environment detection.
    pub fn new(
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        let environment = Self::detect_environment();
        let base_path = Self::determine_base_path(environment);

        Self {
            environment,
            base_path: base_path.into(),
            studio: studio.into(),
            project_id: project_id.into(),
            app_id,
        }
    }

    /// Creates a PathContext with an explicit base path (useful for testing).
    pub fn with_base_path(
        base_path: PathBuf,
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        Self {
            environment: Self::detect_environment(),
            base_path: base_path.into(),
            studio: studio.into(),
            project_id: project_id.into(),
            app_id,
        }
    }

    fn detect_environment() -> RuntimeEnvironment {
        if let Ok(exe_path) = std::env::current_exe() {
            if exe_path.components().any(|c| c.as_os_str() == "target") {
                return RuntimeEnvironment::Development;
            }
        }

        if std::env::var("CARGO").is_ok() || std::env::var("CARGO_MANIFEST_DIR").is_ok() {
            return RuntimeEnvironment::Development;
        }

        RuntimeEnvironment::Production
    }

    fn determine_base_path(environment: RuntimeEnvironment) -> PathBuf {
        match environment {
            RuntimeEnvironment::Development => std::env::var("CARGO_MANIFEST_DIR")
                .map(PathBuf::from)
                .or_else(|_| std::env::current_dir())
                .unwrap_or_else(|_| PathBuf::from(".")),
            // Platform data dir (XDG_DATA_HOME, LocalAppData, Application Support)
            RuntimeEnvironment::Production => dirs::data_local_dir()
                .map(|dir| dir.join("Columbus"))
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    pub fn environment(&self) -> RuntimeEnvironment {
        self.environment
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn studio(&self) -> &str {
        &self.studio
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn app_id(&self) -> &str {
        self.app_id
    }

    /// Returns the project root path: `<base>/<studio>/<project_id>`
    pub fn project_root(&self) -> PathBuf {
        self.base_path.join(&self.studio).join(&self.project_id)
    }

    /// Returns the settings file path: `<project_root>/<app_id>.settings.ron`
    pub fn settings_file(&self) -> PathBuf {
        self.project_root()
            .join(format!("{}.settings.ron", self.app_id))
    }

    /// Returns the data directory path: `<project_root>/data/`
    pub fn data_dir(&self) -> PathBuf {
        self.project_root().join("data")
    }

    /// File holding the identity of the signed-in user between runs.
    pub fn session_file(&self) -> PathBuf {
        self.data_dir().join(format!("{}.session.json", self.app_id))
    }

    /// Snapshot file of the local (in-memory) backend.
    pub fn local_store_file(&self) -> PathBuf {
        self.data_dir().join("local-backend.json")
    }

    /// Returns the logs directory path: `<project_root>/logs/`
    pub fn logs_dir(&self) -> PathBuf {
        self.project_root().join("logs")
    }

    /// Returns a log file path with timestamp: `<project_root>/logs/<app_id>.<timestamp>.log`
    pub fn log_file(&self, timestamp: &str) -> PathBuf {
        self.logs_dir()
            .join(format!("{}.{}.log", self.app_id, timestamp))
    }

    /// Returns a log file path with the current local timestamp.
    pub fn log_file_now(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        self.log_file(&timestamp)
    }

    /// Ensures all necessary directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [self.project_root(), self.data_dir(), self.logs_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
            }
        }

        Ok(())
    }
}
