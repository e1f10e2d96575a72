//! Configuration commands.

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};

/// Dump the current configuration to stdout.
pub fn dump(config: &HarnessConfig) -> HarnessResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| HarnessError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", HarnessConfig::default_path().display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &HarnessConfig) -> HarnessResult<()> {
    config.validate().map_err(HarnessError::Config)?;

    match config.google.web_client_id {
        Some(_) => println!("Google web client ID is set."),
        None => println!("Google web client ID is not set; tokens will lack an audience."),
    }
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> HarnessResult<()> {
    let config_path = HarnessConfig::default_path();
    println!("config: {}", config_path.display());
    Ok(())
}
