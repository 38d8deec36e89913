use std::io::{BufRead, Write};

use backend::API_KEY_ENV;
use color_eyre::Result;

use crate::cli::ConfigAction;
use crate::config::Config;
use crate::prompt::Prompt;

pub fn run<R: BufRead, W: Write>(
    action: ConfigAction,
    config: &Config,
    prompt: &mut Prompt<R, W>,
) -> Result<()> {
    match action {
        ConfigAction::Show => {}
        ConfigAction::UseLocal => config.use_local()?,
        ConfigAction::UseRemote { project, api_key } => config.use_remote(project, api_key)?,
    }
    show(config, prompt)
}

fn show<R: BufRead, W: Write>(config: &Config, prompt: &mut Prompt<R, W>) -> Result<()> {
    let stored = config.stored_backend()?;
    let effective = config.backend()?;
    let collections = config.collections()?;

    prompt.say(format_args!("settings: {}", config.file_path().display()))?;
    prompt.say(format_args!("mode:     {}", effective.mode))?;
    prompt.say(format_args!("project:  {}", or_unset(&effective.project_id)))?;
    let key_source = if stored.api_key != effective.api_key {
        format!(" (from {API_KEY_ENV})")
    } else {
        String::new()
    };
    prompt.say(format_args!("api key:  {}{key_source}", masked(&effective.api_key)))?;
    prompt.say(format_args!(
        "collections: applicants={} users={} vacancies={} news={} applications={}",
        collections.applicants,
        collections.users,
        collections.vacancies,
        collections.news,
        collections.applications
    ))
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "<unset>" } else { value }
}

/// Only the last four characters of a key are shown.
fn masked(key: &str) -> String {
    if key.is_empty() {
        return "<unset>".to_string();
    }
    let count = key.chars().count();
    let tail: String = key.chars().skip(count.saturating_sub(4)).collect();
    format!("{}{tail}", "*".repeat(count.saturating_sub(4)))
}
