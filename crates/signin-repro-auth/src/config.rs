//! Sign-in options forwarded to the identity provider.

use serde::{Deserialize, Serialize};

/// Options passed to [`IdentityProvider::configure`](crate::IdentityProvider::configure).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignInConfig {
    /// OAuth web client ID used as the ID token audience.
    ///
    /// Without it the provider may still sign the user in but will not
    /// return an ID token.
    pub web_client_id: Option<String>,

    /// Request a server auth code for offline access.
    pub offline_access: bool,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,
}

impl Default for SignInConfig {
    fn default() -> Self {
        Self {
            web_client_id: None,
            offline_access: true,
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
        }
    }
}

impl SignInConfig {
    /// Default scope: basic profile and email.
    pub const DEFAULT_SCOPE: &'static str = "email";

    /// Required suffix of Google OAuth client IDs.
    pub const CLIENT_ID_SUFFIX: &'static str = ".apps.googleusercontent.com";

    /// Creates a config for the given web client ID.
    pub fn new(web_client_id: impl Into<String>) -> Self {
        Self {
            web_client_id: Some(web_client_id.into()),
            ..Self::default()
        }
    }

    /// Sets offline access.
    pub fn with_offline_access(mut self, offline_access: bool) -> Self {
        self.offline_access = offline_access;
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref id) = self.web_client_id {
            if id.is_empty() {
                return Err("web_client_id must not be empty".to_string());
            }
            if !id.ends_with(Self::CLIENT_ID_SUFFIX) {
                return Err(format!(
                    "web_client_id should end with {}",
                    Self::CLIENT_ID_SUFFIX
                ));
            }
        }

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        Ok(())
    }
}
