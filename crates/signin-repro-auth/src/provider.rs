//! IdentityProvider trait definition.
//!
//! This module defines the [`IdentityProvider`] trait, the seam between the
//! reconciler and a native sign-in SDK, together with the response shapes
//! such an SDK hands back.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::config::SignInConfig;
use crate::error::AuthResult;

/// Profile of the signed-in user as cached by the SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Stable account identifier.
    pub id: Option<String>,
    /// Account email address.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
}

impl UserProfile {
    /// Creates a profile with only an email.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }
}

/// A signed-in session: the ID token, if the SDK returned one, and the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSession {
    /// The OpenID Connect ID token. Opaque to this crate.
    pub id_token: Option<String>,
    /// The user the session belongs to.
    pub user: UserProfile,
}

impl UserSession {
    /// Creates a session with the given token and user.
    pub fn new(id_token: Option<String>, user: UserProfile) -> Self {
        Self { id_token, user }
    }

    /// Returns the ID token if it is present and non-empty.
    pub fn usable_token(&self) -> Option<&str> {
        self.id_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns the user's email, if known.
    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }
}

/// Response of an interactive or silent sign-in call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInResponse {
    /// The SDK reports success. The session may still lack an ID token.
    Success(UserSession),
    /// The user dismissed the sign-in UI.
    Cancelled,
    /// Any other response, labelled by the SDK (e.g. `noSavedCredentialFound`).
    Other {
        /// The SDK's response type label.
        kind: String,
    },
}

impl SignInResponse {
    /// Creates an `Other` response.
    pub fn other(kind: impl Into<String>) -> Self {
        Self::Other { kind: kind.into() }
    }

    /// Returns the response type label.
    pub fn kind(&self) -> &str {
        match self {
            Self::Success(_) => "success",
            Self::Cancelled => "cancelled",
            Self::Other { kind } => kind,
        }
    }

    /// Returns the session of a successful response carrying a non-empty token.
    pub fn token_session(&self) -> Option<&UserSession> {
        match self {
            Self::Success(session) if session.usable_token().is_some() => Some(session),
            _ => None,
        }
    }
}

impl fmt::Display for SignInResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Tokens held in the SDK's session store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachedTokens {
    /// Cached ID token.
    pub id_token: Option<String>,
    /// Cached access token.
    pub access_token: Option<String>,
}

/// A boxed future for async trait methods.
///
/// Boxing keeps the trait object-safe so the reconciler can hold an
/// `Arc<dyn IdentityProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The capability surface of a native sign-in SDK.
///
/// Implementations are opaque to the reconciler: it only relies on the
/// response shapes above. Synchronous methods read the SDK's local cache and
/// must not block on the network.
pub trait IdentityProvider: Send + Sync {
    /// Returns the name of this provider (e.g., "google", "scripted").
    fn name(&self) -> &str;

    /// Applies sign-in options. Called once before the first sign-in.
    fn configure(&self, config: &SignInConfig) -> AuthResult<()>;

    /// Verifies the identity service is reachable on this device.
    fn check_availability(&self) -> BoxFuture<'_, AuthResult<()>>;

    /// Runs the interactive sign-in.
    fn sign_in(&self) -> BoxFuture<'_, AuthResult<SignInResponse>>;

    /// Attempts to reuse an existing session without prompting.
    fn sign_in_silently(&self) -> BoxFuture<'_, AuthResult<SignInResponse>>;

    /// Whether the SDK remembers a previous sign-in on this device.
    fn has_previous_sign_in(&self) -> bool;

    /// Reads the tokens of the current session.
    fn get_tokens(&self) -> BoxFuture<'_, AuthResult<CachedTokens>>;

    /// Returns the cached current-user record.
    fn current_user(&self) -> Option<UserSession>;

    /// Revokes the app's access for the current user.
    fn revoke_access(&self) -> BoxFuture<'_, AuthResult<()>>;

    /// Signs the current user out locally.
    fn sign_out(&self) -> BoxFuture<'_, AuthResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_kinds() {
        assert_eq!(
            SignInResponse::Success(UserSession::default()).kind(),
            "success"
        );
        assert_eq!(SignInResponse::Cancelled.kind(), "cancelled");
        assert_eq!(
            SignInResponse::other("noSavedCredentialFound").to_string(),
            "noSavedCredentialFound"
        );
    }

    #[test]
    fn usable_token_ignores_empty() {
        let session = UserSession::new(Some(String::new()), UserProfile::default());
        assert!(session.usable_token().is_none());

        let session = UserSession::new(Some("tok".into()), UserProfile::with_email("a@b.c"));
        assert_eq!(session.usable_token(), Some("tok"));
        assert_eq!(session.email(), Some("a@b.c"));
    }

    #[test]
    fn token_session_only_for_success_with_token() {
        let without = SignInResponse::Success(UserSession::default());
        assert!(without.token_session().is_none());
        assert!(SignInResponse::Cancelled.token_session().is_none());

        let with = SignInResponse::Success(UserSession::new(
            Some("tok".into()),
            UserProfile::default(),
        ));
        assert!(with.token_session().is_some());
    }

    #[test]
    fn session_deserializes_with_missing_fields() {
        let session: UserSession =
            serde_json::from_str(r#"{"user": {"email": "dev@example.com"}}"#).unwrap();
        assert!(session.id_token.is_none());
        assert_eq!(session.email(), Some("dev@example.com"));
    }
}
