//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use signin_repro_core::TracingOutputFormat;

/// signin-repro - replay Google sign-in repro scenarios
#[derive(Debug, Parser)]
#[command(name = "signin-repro")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "SIGNIN_REPRO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Format of the debug output written to stderr (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<TracingOutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a scenario and print the final screen
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Print each log line as it is appended
        #[arg(long, short)]
        follow: bool,
    },

    /// Press the sign-in button against a scenario's provider
    SignIn {
        /// Scenario file
        scenario: PathBuf,

        /// Number of presses
        #[arg(long, short = 'n', default_value = "1")]
        attempts: usize,

        /// Output outcomes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_globals() {
        let cli = Cli::try_parse_from([
            "signin-repro",
            "run",
            "scenarios/cancel.toml",
            "--follow",
            "-v",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert!(cli.debug);
        assert_eq!(cli.log_format, Some(TracingOutputFormat::Json));
        match cli.command {
            Command::Run { scenario, follow } => {
                assert_eq!(scenario, PathBuf::from("scenarios/cancel.toml"));
                assert!(follow);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn sign_in_defaults_to_one_attempt() {
        let cli = Cli::try_parse_from(["signin-repro", "sign-in", "s.toml"]).unwrap();
        match cli.command {
            Command::SignIn { attempts, json, .. } => {
                assert_eq!(attempts, 1);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_log_format() {
        let result = Cli::try_parse_from(["signin-repro", "--log-format", "xml", "config", "path"]);
        assert!(result.is_err());
    }
}
