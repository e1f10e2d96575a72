//! Harness error types.

use thiserror::Error;

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur in the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Scenario file error.
    #[error("scenario error: {0}")]
    Scenario(String),

    /// Identity provider error outside a sign-in attempt.
    #[error("provider error: {0}")]
    Auth(#[from] signin_repro_auth::AuthError),
}
