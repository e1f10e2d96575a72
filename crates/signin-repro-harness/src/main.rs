//! signin-repro CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use signin_repro_core::{TracingConfig, init_tracing};
use signin_repro_harness::cli::{Cli, Command, ConfigAction};
use signin_repro_harness::commands;
use signin_repro_harness::config::HarnessConfig;
use signin_repro_harness::error::{HarnessError, HarnessResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut tracing_config = if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default().with_level(Level::INFO)
    };
    if let Some(format) = cli.log_format {
        tracing_config = tracing_config.with_format(format);
    }
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> HarnessResult<HarnessConfig> {
    let config = if let Some(ref path) = cli.config {
        HarnessConfig::load_from(path)
    } else {
        HarnessConfig::load()
    };
    config.map_err(HarnessError::Config)
}

async fn run(cli: Cli, config: HarnessConfig) -> HarnessResult<()> {
    match cli.command {
        Command::Run { scenario, follow } => commands::run::run(&config, &scenario, follow).await,
        Command::SignIn {
            scenario,
            attempts,
            json,
        } => commands::sign_in::sign_in(&config, &scenario, attempts, json).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
