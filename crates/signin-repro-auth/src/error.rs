//! Error types for identity provider operations.
//!
//! These errors are produced by [`IdentityProvider`](crate::IdentityProvider)
//! implementations and by [`SignInOutcome::into_result`](crate::SignInOutcome::into_result).
//! The reconciler never lets them escape `attempt_sign_in`.

use std::fmt;
use thiserror::Error;

/// The category of an authentication error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    /// The identity service cannot be reached on this device.
    ProviderUnavailable,
    /// The user dismissed the sign-in sheet.
    UserCancelled,
    /// The provider answered with something that is neither a usable success
    /// nor a cancellation.
    AmbiguousResponse,
    /// A session read (silent sign-in, cached tokens) found nothing usable.
    RecoveryFailed,
    /// Anything else.
    UnexpectedError,
}

impl AuthErrorCode {
    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "provider_unavailable",
            Self::UserCancelled => "user_cancelled",
            Self::AmbiguousResponse => "ambiguous_response",
            Self::RecoveryFailed => "recovery_failed",
            Self::UnexpectedError => "unexpected_error",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while talking to an identity provider.
#[derive(Debug, Error)]
pub struct AuthError {
    code: AuthErrorCode,
    message: String,
    /// The provider that generated this error (e.g., "google", "scripted").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AuthError {
    /// Creates a new error with the given code and message.
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates a provider-unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::ProviderUnavailable, message)
    }

    /// Creates a user-cancelled error.
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::UserCancelled, message)
    }

    /// Creates an ambiguous-response error carrying the response kind.
    pub fn ambiguous(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self::new(
            AuthErrorCode::AmbiguousResponse,
            format!("no ID token in {} response", kind),
        )
    }

    /// Creates a recovery-failed error.
    pub fn recovery_failed(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::RecoveryFailed, message)
    }

    /// Creates an unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::UnexpectedError, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> AuthErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for identity provider operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_names() {
        assert_eq!(
            AuthErrorCode::ProviderUnavailable.as_str(),
            "provider_unavailable"
        );
        assert_eq!(AuthErrorCode::RecoveryFailed.to_string(), "recovery_failed");
    }

    #[test]
    fn ambiguous_error_mentions_kind() {
        let err = AuthError::ambiguous("noSavedCredentialFound");
        assert_eq!(err.code(), AuthErrorCode::AmbiguousResponse);
        assert!(err.message().contains("noSavedCredentialFound"));
        assert!(err.provider().is_none());
    }

    #[test]
    fn display_includes_provider_and_code() {
        let err = AuthError::unavailable("play services missing").with_provider("google");
        assert_eq!(
            err.to_string(),
            "[google] provider_unavailable: play services missing"
        );
    }

    #[test]
    fn error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("keychain locked");
        let err = AuthError::recovery_failed("token read failed").with_source(io_err);
        assert!(err.source().is_some());
    }
}
