//! Sign-in reconciliation.
//!
//! [`Reconciler`] turns the raw response of one interactive sign-in into a
//! [`SignInOutcome`]. When the response is cancelled (with a previous session
//! on the device) or carries no ID token, it tries to recover a token from
//! the existing session, in a fixed order:
//!
//! 1. silent sign-in
//! 2. cached tokens from the session store
//! 3. the cached current-user record
//!
//! The first strategy that yields a non-empty token wins. Failures inside a
//! strategy only mean "try the next one".

use std::fmt;
use std::sync::Arc;

use signin_repro_core::LogStore;
use tracing::{debug, info};

use crate::config::SignInConfig;
use crate::error::{AuthError, AuthResult};
use crate::outcome::{SignInOutcome, SignedIn};
use crate::provider::{IdentityProvider, SignInResponse};

const LOG_PREFIX: &str = "[Repro][Auth]";

/// A way of recovering an ID token without user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Non-interactive sign-in against the provider.
    SilentSignIn,
    /// Tokens read from the SDK's session store.
    CachedTokens,
    /// The SDK's last-known current-user record.
    CurrentUser,
}

impl RecoveryStrategy {
    /// Strategies in the order they are attempted.
    pub const ORDER: [RecoveryStrategy; 3] =
        [Self::SilentSignIn, Self::CachedTokens, Self::CurrentUser];

    /// Label used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SilentSignIn => "silent-sign-in",
            Self::CachedTokens => "cached-tokens",
            Self::CurrentUser => "current-user",
        }
    }
}

impl fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps an [`IdentityProvider`] and reports every step to a [`LogStore`].
pub struct Reconciler {
    provider: Arc<dyn IdentityProvider>,
    logs: Arc<LogStore>,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl Reconciler {
    /// Creates a reconciler over `provider`, logging into `logs`.
    pub fn new(provider: Arc<dyn IdentityProvider>, logs: Arc<LogStore>) -> Self {
        Self { provider, logs }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    /// Validates `config` and forwards it to the provider.
    pub fn configure(&self, config: &SignInConfig) -> AuthResult<()> {
        config
            .validate()
            .map_err(|e| AuthError::unexpected(e).with_provider(self.provider.name()))?;
        self.provider.configure(config)?;

        self.log(format!(
            "configured provider={} webClientId={} offlineAccess={}",
            self.provider.name(),
            if config.web_client_id.is_some() {
                "set"
            } else {
                "missing"
            },
            config.offline_access
        ));
        Ok(())
    }

    /// Runs one sign-in attempt and classifies its outcome.
    ///
    /// Never fails: errors from the availability check or the interactive
    /// call become [`SignInOutcome::Error`].
    pub async fn attempt_sign_in(&self) -> SignInOutcome {
        match self.reconcile().await {
            Ok(outcome) => outcome,
            Err(err) => {
                info!(provider = self.provider.name(), error = %err, "sign-in failed");
                self.log(format!("ERROR {}", err));
                SignInOutcome::Error {
                    message: err.message().to_string(),
                }
            }
        }
    }

    async fn reconcile(&self) -> AuthResult<SignInOutcome> {
        self.provider.check_availability().await?;

        let response = self.provider.sign_in().await?;
        debug!(kind = response.kind(), "interactive sign-in returned");
        self.log(format!("sign-in response type={}", response.kind()));

        if let Some(session) = response.token_session()
            && let Some(token) = session.usable_token()
        {
            let signed_in = SignedIn::new(token, session.user.email.clone());
            self.log(format!(
                "success idTokenLength={} email={}",
                signed_in.token_len(),
                signed_in.email_or_none()
            ));
            return Ok(SignInOutcome::Success(signed_in));
        }

        if matches!(response, SignInResponse::Cancelled) {
            if !self.provider.has_previous_sign_in() {
                self.log("cancelled with no previous sign-in, nothing to recover");
                return Ok(SignInOutcome::Cancelled);
            }

            self.log("cancelled with previous sign-in, attempting silent recovery");
            return Ok(match self.recover().await {
                Some(signed_in) => SignInOutcome::Success(signed_in),
                None => {
                    self.log("recovery found no token, reporting cancelled");
                    SignInOutcome::Cancelled
                }
            });
        }

        self.log(format!(
            "response type={} carried no ID token, attempting silent recovery",
            response.kind()
        ));
        Ok(match self.recover().await {
            Some(signed_in) => SignInOutcome::Success(signed_in),
            None => {
                self.log(format!("no-id-token responseType={}", response.kind()));
                SignInOutcome::NoIdToken {
                    response_kind: response.kind().to_string(),
                }
            }
        })
    }

    /// Tries each [`RecoveryStrategy`] in order; the first token wins.
    pub async fn recover(&self) -> Option<SignedIn> {
        for strategy in RecoveryStrategy::ORDER {
            if let Some(signed_in) = self.try_strategy(strategy).await {
                self.log(format!(
                    "recovered via {} idTokenLength={} email={}",
                    strategy,
                    signed_in.token_len(),
                    signed_in.email_or_none()
                ));
                return Some(signed_in);
            }
        }
        None
    }

    async fn try_strategy(&self, strategy: RecoveryStrategy) -> Option<SignedIn> {
        match strategy {
            RecoveryStrategy::SilentSignIn => {
                let response = self.provider.sign_in_silently().await.ok()?;
                let session = response.token_session()?;
                let token = session.usable_token()?;
                Some(SignedIn::new(token, session.user.email.clone()))
            }
            RecoveryStrategy::CachedTokens => {
                let tokens = self.provider.get_tokens().await.ok()?;
                let token = tokens.id_token.filter(|t| !t.is_empty())?;
                let email = self.provider.current_user().and_then(|s| s.user.email);
                Some(SignedIn::new(token, email))
            }
            RecoveryStrategy::CurrentUser => {
                let session = self.provider.current_user()?;
                let token = session.usable_token()?;
                Some(SignedIn::new(token, session.user.email.clone()))
            }
        }
    }

    /// Revokes access and signs out. Both are always attempted; failures are
    /// dropped.
    pub async fn clear_session(&self) {
        if let Err(err) = self.provider.revoke_access().await {
            debug!(error = %err, "revoke failed");
        }
        if let Err(err) = self.provider.sign_out().await {
            debug!(error = %err, "sign-out failed");
        }
    }

    /// Email of the SDK's cached current user.
    pub fn current_signed_in_email(&self) -> Option<String> {
        self.provider.current_user().and_then(|s| s.user.email)
    }

    fn log(&self, message: impl AsRef<str>) {
        self.logs
            .append(format!("{} {}", LOG_PREFIX, message.as_ref()));
    }
}
