//! Canonical outcome of one sign-in attempt.

use std::fmt;

use crate::error::{AuthError, AuthResult};

/// A usable ID token and the email it was issued for.
///
/// `Debug` prints the token length only.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedIn {
    /// The ID token, never empty.
    pub id_token: String,
    /// The account email, when the SDK reported one.
    pub email: Option<String>,
}

impl SignedIn {
    /// Creates a signed-in value.
    pub fn new(id_token: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id_token: id_token.into(),
            email,
        }
    }

    /// Length of the ID token in bytes.
    pub fn token_len(&self) -> usize {
        self.id_token.len()
    }

    /// The email, or `none`.
    pub fn email_or_none(&self) -> &str {
        self.email.as_deref().unwrap_or("none")
    }
}

impl fmt::Debug for SignedIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedIn")
            .field("id_token_len", &self.token_len())
            .field("email", &self.email)
            .finish()
    }
}

/// The four canonical outcomes of [`Reconciler::attempt_sign_in`](crate::Reconciler::attempt_sign_in).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// A usable ID token was obtained, interactively or by recovery.
    Success(SignedIn),
    /// The user cancelled and no session could be recovered.
    Cancelled,
    /// The provider responded without a token and recovery failed.
    NoIdToken {
        /// Type label of the original response.
        response_kind: String,
    },
    /// The availability check or the interactive call failed.
    Error {
        /// Human-readable failure message.
        message: String,
    },
}

impl SignInOutcome {
    /// Creates a success outcome.
    pub fn success(id_token: impl Into<String>, email: Option<String>) -> Self {
        Self::Success(SignedIn::new(id_token, email))
    }

    /// Short status label.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Cancelled => "cancelled",
            Self::NoIdToken { .. } => "no-id-token",
            Self::Error { .. } => "error",
        }
    }

    /// Returns true for [`SignInOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the ID token of a successful outcome.
    pub fn id_token(&self) -> Option<&str> {
        match self {
            Self::Success(signed_in) => Some(&signed_in.id_token),
            _ => None,
        }
    }

    /// Maps the outcome onto the error taxonomy.
    pub fn into_result(self) -> AuthResult<SignedIn> {
        match self {
            Self::Success(signed_in) => Ok(signed_in),
            Self::Cancelled => Err(AuthError::cancelled("sign-in was cancelled")),
            Self::NoIdToken { response_kind } => Err(AuthError::ambiguous(response_kind)),
            Self::Error { message } => Err(AuthError::unexpected(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthErrorCode;

    #[test]
    fn debug_never_prints_token() {
        let outcome = SignInOutcome::success("eyJhbGciOi.secret.sig", Some("a@b.c".into()));
        let debug = format!("{:?}", outcome);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("id_token_len: 21"));
    }

    #[test]
    fn status_labels() {
        assert_eq!(SignInOutcome::success("t", None).status(), "success");
        assert_eq!(SignInOutcome::Cancelled.status(), "cancelled");
        assert_eq!(
            SignInOutcome::NoIdToken {
                response_kind: "success".into()
            }
            .status(),
            "no-id-token"
        );
        assert_eq!(
            SignInOutcome::Error {
                message: "boom".into()
            }
            .status(),
            "error"
        );
    }

    #[test]
    fn into_result_maps_taxonomy() {
        let ok = SignInOutcome::success("tok", None).into_result().unwrap();
        assert_eq!(ok.id_token, "tok");
        assert_eq!(ok.email_or_none(), "none");

        let err = SignInOutcome::Cancelled.into_result().unwrap_err();
        assert_eq!(err.code(), AuthErrorCode::UserCancelled);

        let err = SignInOutcome::NoIdToken {
            response_kind: "noSavedCredentialFound".into(),
        }
        .into_result()
        .unwrap_err();
        assert_eq!(err.code(), AuthErrorCode::AmbiguousResponse);
        assert!(err.message().contains("noSavedCredentialFound"));

        let err = SignInOutcome::Error {
            message: "boom".into(),
        }
        .into_result()
        .unwrap_err();
        assert_eq!(err.code(), AuthErrorCode::UnexpectedError);
        assert_eq!(err.message(), "boom");
    }
}
