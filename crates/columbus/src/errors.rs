use std::sync::OnceLock;

use applicant::ApplicationError;
use color_eyre::{Report, Result};
use tracing::error;

static INIT: OnceLock<()> = OnceLock::new();

/// Install the eyre report hook and the panic hook. Calling it twice is a no-op.
pub fn init() -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let hooks = color_eyre::config::HookBuilder::default()
        .panic_section("This is a bug. Please report it to the Columbus support team.")
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .try_into_hooks()?;

    let (panic_hook, eyre_hook) = hooks;
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        #[cfg(not(debug_assertions))]
        {
            use human_panic::{handle_dump, metadata, print_msg};
            let metadata = metadata!();
            let file_path = handle_dump(&metadata, panic_info);
            if print_msg(file_path, &metadata).is_err() {
                eprintln!("{}", panic_hook.panic_report(panic_info));
            }
        }
        let msg = format!("{}", panic_hook.panic_report(panic_info));
        error!("Error: {}", strip_ansi_escapes::strip_str(msg));

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        std::process::exit(libc::EXIT_FAILURE);
    }));

    let _ = INIT.set(());
    Ok(())
}

/// Report whose top line is the message meant for the applicant.
pub fn user_error(err: ApplicationError) -> Report {
    let message = err.user_message();
    Report::new(err).wrap_err(message)
}
