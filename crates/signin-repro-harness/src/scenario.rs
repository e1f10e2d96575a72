//! Scenario files.
//!
//! A scenario describes how the identity provider behaves and which host
//! events arrive, in order. Scenarios are TOML:
//!
//! ```toml
//! name = "missing-token-after-callback"
//! initial_url = "com.example.repro:/oauth2redirect?code=abc"
//!
//! [provider]
//! has_previous_sign_in = true
//! sign_in = [{ type = "success", email = "dev@example.com" }]
//! silent_sign_in = { type = "success", id_token = "eyJ.payload.sig" }
//!
//! [[events]]
//! event = "sign-in"
//!
//! [[events]]
//! event = "app-state"
//! state = "active"
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use signin_repro_auth::{ProviderScript, ScriptedProvider, SignInOutcome};
use signin_repro_core::CallbackSource;

use crate::analytics::LocalAnalytics;
use crate::app::ReproApp;
use crate::error::{HarnessError, HarnessResult};
use crate::lifecycle::AppState;

/// A scripted repro session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Display name, defaults to the file stem.
    pub name: Option<String>,

    /// Free-form notes.
    pub description: Option<String>,

    /// URL the app was launched with.
    pub initial_url: Option<String>,

    /// Provider behavior.
    pub provider: ProviderScript,

    /// Analytics behavior.
    pub analytics: AnalyticsScript,

    /// Host events, applied in order.
    pub events: Vec<HostEvent>,
}

/// Analytics behavior in a scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsScript {
    /// When set, analytics calls fail with this message.
    pub failure: Option<String>,
}

/// Something that happens to the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum HostEvent {
    /// A URL event delivered while running.
    Url { url: String },
    /// A lifecycle transition.
    AppState { state: AppState },
    /// The sign-in button is pressed.
    SignIn,
    /// The "Clear Session" button is pressed.
    ClearSession,
    /// The "Clear Logs" button is pressed.
    ClearLogs,
}

impl HostEvent {
    /// Applies the event to `app`. Returns the outcome for sign-in presses.
    pub async fn apply(&self, app: &ReproApp) -> Option<SignInOutcome> {
        match self {
            Self::Url { url } => {
                app.incoming_url(CallbackSource::Event, Some(url));
                None
            }
            Self::AppState { state } => {
                app.app_state_changed(*state);
                None
            }
            Self::SignIn => app.press_sign_in().await,
            Self::ClearSession => {
                app.press_clear_session().await;
                None
            }
            Self::ClearLogs => {
                app.press_clear_logs();
                None
            }
        }
    }
}

impl Scenario {
    /// Loads a scenario file.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Scenario(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut scenario = Self::parse(&content)?;
        if scenario.name.is_none() {
            scenario.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        Ok(scenario)
    }

    /// Parses a scenario from TOML text.
    pub fn parse(content: &str) -> HarnessResult<Self> {
        toml::from_str(content)
            .map_err(|e| HarnessError::Scenario(format!("failed to parse scenario: {}", e)))
    }

    /// Name for display.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    /// A fresh provider playing this scenario's script.
    pub fn provider(&self) -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider::new(self.provider.clone()))
    }

    /// A fresh analytics backend for this scenario.
    pub fn analytics(&self) -> LocalAnalytics {
        match self.analytics.failure {
            Some(ref message) => LocalAnalytics::failing(message.clone()),
            None => LocalAnalytics::new(),
        }
    }
}
