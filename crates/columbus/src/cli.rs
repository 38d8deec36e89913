use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "columbus", version, about = "Columbus Work and Travel applicant client")]
pub struct Cli {
    /// Log info-level events to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Keep settings, session and local data under this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Create an account
    Register,
    /// Sign in with email and password
    Login,
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Fill in and submit the application form
    Apply {
        #[arg(long, value_enum, default_value_t = Variant::Consultation)]
        variant: Variant,
    },
    /// Show the status of the submitted application
    Status,
    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// List vacancies and news
    Feed,
    /// Respond to a vacancy
    Respond {
        vacancy_id: String,
    },
    /// About the program
    About,
    /// Inspect or change the backend configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProfileAction {
    Show,
    Edit,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    Show,
    /// Use the local store under the data directory
    UseLocal,
    /// Use the managed backend
    UseRemote {
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    Consultation,
    Enrollment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_defaults_to_consultation() {
        let cli = Cli::try_parse_from(["columbus", "apply"]).unwrap();
        assert_eq!(
            cli.cmd,
            Cmd::Apply {
                variant: Variant::Consultation
            }
        );

        let cli = Cli::try_parse_from(["columbus", "apply", "--variant", "enrollment", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(
            cli.cmd,
            Cmd::Apply {
                variant: Variant::Enrollment
            }
        );
    }

    #[test]
    fn nested_commands() {
        let cli = Cli::try_parse_from([
            "columbus",
            "config",
            "use-remote",
            "--project",
            "columbus-wt",
        ])
        .unwrap();
        assert_eq!(
            cli.cmd,
            Cmd::Config {
                action: ConfigAction::UseRemote {
                    project: Some("columbus-wt".into()),
                    api_key: None
                }
            }
        );
        assert!(Cli::try_parse_from(["columbus", "respond"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
