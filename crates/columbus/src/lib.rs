//! Terminal client for applicants of the Columbus Work and Travel program.

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod prompt;
pub mod session_store;

use app::{AppBuilder, Application};
use color_eyre::{Result, eyre::eyre};
use paths::PathContext;
use tracing::info;
use tracing::level_filters::LevelFilter;

use crate::cli::{Cli, Cmd};
use crate::commands::Services;
use crate::config::Config;
use crate::prompt::Prompt;
use crate::session_store::SessionStore;

pub struct Columbus;

impl Application for Columbus {
    const APP_ID: &'static str = "columbus";
}

pub async fn run(cli: Cli) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let builder = match &cli.data_dir {
        Some(dir) => AppBuilder::<Columbus>::with_path_context(
            PathContext::with_base_path(
                dir.clone(),
                Columbus::STUDIO,
                Columbus::PROJECT_ID,
                Columbus::APP_ID,
            ),
            version,
        ),
        None => AppBuilder::<Columbus>::new(version),
    };
    let console_level = if cli.verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let ctx = builder
        .console_level(console_level)
        .build()
        .map_err(|err| eyre!(err))?;
    info!(app = ctx.app_id(), version = ctx.version(), "starting");

    let paths = ctx.path_context();
    let config = Config::open(paths.settings_file())?;
    let mut prompt = Prompt::stdio();

    match cli.cmd {
        Cmd::Config { action } => commands::run_config(action, &config, &mut prompt),
        cmd => {
            let backend = config
                .backend()?
                .connect(Some(paths.local_store_file().as_path()))?;
            let services = Services::new(
                backend,
                &config.collections()?,
                SessionStore::new(paths.session_file()),
            );
            commands::run(cmd, &services, &mut prompt).await
        }
    }
}
