use paths::PathContext;
use std::marker::PhantomData;
#[cfg(debug_assertions)]
use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application infrastructure context.
///
/// Contains path management, version info, and logging infrastructure.
pub struct AppContext {
    pub path_context: PathContext,
    pub version: &'static str,
    /// The log guard must be kept alive for the duration of the application
    /// to ensure log messages are properly flushed.
    _log_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.path_context.app_id()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }
}

/// Application metadata trait.
///
/// Define your application's identity by implementing this trait.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "columbus";
    const PROJECT_ID: &'static str = "work_and_travel";
}

/// Builder for creating applications with proper initialization.
pub struct AppBuilder<A: Application> {
    path_context: PathContext,
    version: &'static str,
    console_level: LevelFilter,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Create a new application builder with the platform path layout.
    ///
    /// Debug builds keep everything under `<workspace>/.out` so development
    /// runs never touch the real user data directory.
    pub fn new(version: &'static str) -> Self {
        #[cfg(debug_assertions)]
        let path_context = PathContext::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("..")
                .join(".out"),
            A::STUDIO,
            A::PROJECT_ID,
            A::APP_ID,
        );
        #[cfg(not(debug_assertions))]
        let path_context = PathContext::new(A::STUDIO, A::PROJECT_ID, A::APP_ID);

        Self::with_path_context(path_context, version)
    }

    /// Use an explicit path context (tests, `--data-dir` overrides).
    pub fn with_path_context(path_context: PathContext, version: &'static str) -> Self {
        Self {
            path_context,
            version,
            console_level: LevelFilter::WARN,
            _marker: PhantomData,
        }
    }

    /// Level of the stderr layer. The file layer is unaffected.
    pub fn console_level(mut self, level: LevelFilter) -> Self {
        self.console_level = level;
        self
    }

    /// Create the directory tree and install the global subscriber.
    ///
    /// Logging goes to a per-run file under `logs/` and to stderr. Both layers
    /// respect `RUST_LOG` when it is set. Installing a subscriber twice (tests)
    /// is not an error; the first one stays active.
    pub fn build(self) -> Result<AppContext, BoxError> {
        self.path_context.ensure_directories()?;

        let log_file_path = self.path_context.log_file_now();
        let log_dir = log_file_path
            .parent()
            .ok_or("log file path should have parent directory")?;
        let log_filename = log_file_path
            .file_name()
            .ok_or("log file path should have filename")?;

        let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        #[cfg(debug_assertions)]
        let file_level = LevelFilter::INFO;
        #[cfg(not(debug_assertions))]
        let file_level = LevelFilter::WARN;

        let file_layer = fmt::Layer::default()
            .with_target(false)
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(env_filter(file_level));

        let console_layer = fmt::Layer::default()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter(self.console_level));

        let installed = tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .try_init()
            .is_ok();
        if installed {
            tracing::info!(
                app = A::APP_ID,
                version = %self.version,
                log = %log_file_path.display(),
                "logging initialised"
            );
        }

        Ok(AppContext {
            path_context: self.path_context,
            version: self.version,
            _log_guard: installed.then_some(guard),
        })
    }
}

fn env_filter(default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestApp;

    impl Application for TestApp {
        const APP_ID: &'static str = "test-app";
    }

    #[test]
    fn build_creates_directories_and_keeps_identity() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = PathContext::with_base_path(
            tmp.path().to_path_buf(),
            TestApp::STUDIO,
            TestApp::PROJECT_ID,
            TestApp::APP_ID,
        );

        let app = AppBuilder::<TestApp>::with_path_context(ctx, "0.0.1")
            .build()
            .unwrap();

        assert_eq!(app.app_id(), "test-app");
        assert_eq!(app.version(), "0.0.1");
        assert!(app.path_context().logs_dir().is_dir());
        assert!(app.path_context().data_dir().is_dir());
    }
}
