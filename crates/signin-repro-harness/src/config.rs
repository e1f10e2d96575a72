//! Harness configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/signin-repro/config.toml` by default.
//!
//! `google.web_client_id` may be written as `env::VAR_NAME` to read the value
//! from the environment instead of committing it to the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use signin_repro_auth::SignInConfig;
use signin_repro_core::LogStore;

/// Configuration for the harness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Debug mode.
    pub debug: bool,

    /// Sign-in options.
    pub google: GoogleSettings,

    /// Diagnostic log settings.
    pub logs: LogSettings,

    /// Analytics settings.
    pub analytics: AnalyticsSettings,
}

/// Sign-in options as written in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth web client ID (supports the `env::` prefix).
    pub web_client_id: Option<String>,

    /// Request offline access.
    pub offline_access: bool,

    /// OAuth scopes.
    pub scopes: Vec<String>,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        let defaults = SignInConfig::default();
        Self {
            web_client_id: None,
            offline_access: defaults.offline_access,
            scopes: defaults.scopes,
        }
    }
}

/// Diagnostic log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Number of lines kept on screen.
    pub capacity: usize,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            capacity: LogStore::DEFAULT_CAPACITY,
        }
    }
}

/// Analytics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Initialize analytics at startup.
    pub enabled: bool,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl HarnessConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("signin-repro")
    }

    /// Checks every section.
    pub fn validate(&self) -> Result<(), String> {
        if self.logs.capacity == 0 {
            return Err("logs.capacity must be at least 1".to_string());
        }
        self.google.to_sign_in_config()?;
        Ok(())
    }
}

impl GoogleSettings {
    /// Resolves references and builds the provider options.
    pub fn to_sign_in_config(&self) -> Result<SignInConfig, String> {
        let web_client_id = self
            .web_client_id
            .as_deref()
            .map(resolve_reference)
            .transpose()
            .map_err(|e| format!("failed to resolve web_client_id: {}", e))?;

        let config = SignInConfig {
            web_client_id,
            offline_access: self.offline_access,
            scopes: self.scopes.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Expands `env::VAR` to the value of `$VAR`; other values pass through.
pub fn resolve_reference(value: &str) -> Result<String, String> {
    match value.strip_prefix("env::") {
        Some(var) => {
            std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
        }
        None => Ok(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HarnessConfig::default();
        assert!(!config.debug);
        assert!(config.google.web_client_id.is_none());
        assert!(config.google.offline_access);
        assert_eq!(config.logs.capacity, 300);
        assert!(config.analytics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_file() {
        let config = HarnessConfig::parse(
            r#"
debug = true

[google]
web_client_id = "123-abc.apps.googleusercontent.com"
offline_access = false
scopes = ["email", "profile"]

[logs]
capacity = 50

[analytics]
enabled = false
"#,
        )
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.logs.capacity, 50);
        assert!(!config.analytics.enabled);

        let sign_in = config.google.to_sign_in_config().unwrap();
        assert_eq!(
            sign_in.web_client_id.as_deref(),
            Some("123-abc.apps.googleusercontent.com")
        );
        assert!(!sign_in.offline_access);
        assert_eq!(sign_in.scopes, vec!["email", "profile"]);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = HarnessConfig::parse("[google]\n").unwrap();
        assert!(config.google.offline_access);
        assert_eq!(config.google.scopes, vec!["email"]);
        assert_eq!(config.logs.capacity, 300);
    }

    #[test]
    fn env_reference_resolves() {
        unsafe {
            std::env::set_var("_SIGNIN_REPRO_TEST_WEB_ID", "env-id.apps.googleusercontent.com");
        }
        let settings = GoogleSettings {
            web_client_id: Some("env::_SIGNIN_REPRO_TEST_WEB_ID".to_string()),
            ..GoogleSettings::default()
        };
        let config = settings.to_sign_in_config().unwrap();
        assert_eq!(
            config.web_client_id.as_deref(),
            Some("env-id.apps.googleusercontent.com")
        );
        unsafe {
            std::env::remove_var("_SIGNIN_REPRO_TEST_WEB_ID");
        }
    }

    #[test]
    fn missing_env_reference_errors() {
        let settings = GoogleSettings {
            web_client_id: Some("env::_SIGNIN_REPRO_MISSING_12345".to_string()),
            ..GoogleSettings::default()
        };
        let err = settings.to_sign_in_config().unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn invalid_client_id_fails_validation() {
        let config = HarnessConfig::parse("[google]\nweb_client_id = \"nope\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_capacity_fails_validation() {
        let config = HarnessConfig::parse("[logs]\ncapacity = 0\n").unwrap();
        assert!(config.validate().unwrap_err().contains("capacity"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logs]\ncapacity = 10\n").unwrap();

        let config = HarnessConfig::load_from(&path).unwrap();
        assert_eq!(config.logs.capacity, 10);

        let missing = HarnessConfig::load_from(&dir.path().join("missing.toml"));
        assert!(missing.unwrap_err().contains("failed to read config"));
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(resolve_reference("plain").unwrap(), "plain");
    }
}
