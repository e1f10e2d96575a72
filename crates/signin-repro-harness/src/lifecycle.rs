//! Host application lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Foreground/background state reported by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    /// In the foreground and receiving events.
    Active,
    /// Transitioning, e.g. while the sign-in sheet is shown.
    Inactive,
    /// In the background.
    Background,
}

impl AppState {
    /// Label used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Background => "background",
        }
    }
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
