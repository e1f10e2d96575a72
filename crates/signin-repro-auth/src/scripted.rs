//! Scripted identity provider.
//!
//! [`ScriptedProvider`] plays back a [`ProviderScript`]: a description of what
//! each SDK call answers. It keeps a small amount of session state so that a
//! scenario behaves like a device (a successful sign-in becomes the cached
//! current user, signing out forgets it) and records every call for
//! inspection.
//!
//! Scripts are plain serde data, so they can live in a scenario file:
//!
//! ```toml
//! has_previous_sign_in = true
//!
//! [[sign_in]]
//! type = "success"
//! email = "dev@example.com"
//!
//! [silent_sign_in]
//! type = "success"
//! id_token = "eyJhbGciOiJSUzI1NiJ9.payload.sig"
//! email = "dev@example.com"
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SignInConfig;
use crate::error::{AuthError, AuthResult};
use crate::provider::{
    BoxFuture, CachedTokens, IdentityProvider, SignInResponse, UserProfile, UserSession,
};

const PROVIDER_NAME: &str = "scripted";

/// Response kind the SDK reports when there is no session to reuse.
pub const NO_SAVED_CREDENTIAL: &str = "noSavedCredentialFound";

/// One scripted answer to an interactive or silent sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScriptedResponse {
    /// A success response, with or without an ID token.
    Success {
        #[serde(default)]
        id_token: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
    /// The user dismissed the sheet.
    Cancelled,
    /// Any other response type.
    Other {
        /// The response type label.
        kind: String,
    },
    /// The call fails.
    Error {
        /// Failure message.
        message: String,
    },
}

impl ScriptedResponse {
    /// Creates a success response.
    pub fn success(id_token: Option<&str>, email: Option<&str>) -> Self {
        Self::Success {
            id_token: id_token.map(String::from),
            email: email.map(String::from),
        }
    }

    /// Creates an `Other` response.
    pub fn other(kind: impl Into<String>) -> Self {
        Self::Other { kind: kind.into() }
    }

    /// Creates a failing response.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    fn to_response(&self, on_error: fn(String) -> AuthError) -> AuthResult<SignInResponse> {
        match self {
            Self::Success { id_token, email } => Ok(SignInResponse::Success(UserSession::new(
                id_token.clone(),
                UserProfile {
                    email: email.clone(),
                    ..UserProfile::default()
                },
            ))),
            Self::Cancelled => Ok(SignInResponse::Cancelled),
            Self::Other { kind } => Ok(SignInResponse::other(kind)),
            Self::Error { message } => Err(on_error(message.clone()).with_provider(PROVIDER_NAME)),
        }
    }
}

/// What each SDK call answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderScript {
    /// When set, the availability check fails with this message.
    pub unavailable: Option<String>,

    /// Whether the device remembers a previous sign-in at start.
    pub has_previous_sign_in: bool,

    /// Interactive responses, consumed in order. The last one repeats once
    /// the queue is exhausted.
    pub sign_in: Vec<ScriptedResponse>,

    /// Silent sign-in response. Defaults to `noSavedCredentialFound`.
    pub silent_sign_in: Option<ScriptedResponse>,

    /// Tokens in the session store.
    pub tokens: Option<CachedTokens>,

    /// When set, reading tokens fails with this message.
    pub tokens_error: Option<String>,

    /// Cached current-user record at start.
    pub current_user: Option<UserSession>,

    /// When set, revoking access fails with this message.
    pub revoke_error: Option<String>,

    /// When set, signing out fails with this message.
    pub sign_out_error: Option<String>,
}

/// A call made against a [`ScriptedProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCall {
    /// `configure`
    Configure,
    /// `check_availability`
    CheckAvailability,
    /// Interactive `sign_in`
    SignIn,
    /// `sign_in_silently`
    SignInSilently,
    /// `has_previous_sign_in`
    HasPreviousSignIn,
    /// `get_tokens`
    GetTokens,
    /// `current_user`
    CurrentUser,
    /// `revoke_access`
    RevokeAccess,
    /// `sign_out`
    SignOut,
}

#[derive(Debug)]
struct State {
    next_sign_in: usize,
    has_previous_sign_in: bool,
    current_user: Option<UserSession>,
    signed_out: bool,
    configured: Option<SignInConfig>,
    calls: Vec<ProviderCall>,
}

/// Identity provider that plays back a [`ProviderScript`].
#[derive(Debug)]
pub struct ScriptedProvider {
    script: ProviderScript,
    state: Mutex<State>,
}

impl ScriptedProvider {
    /// Creates a provider playing `script`.
    pub fn new(script: ProviderScript) -> Self {
        let state = State {
            next_sign_in: 0,
            has_previous_sign_in: script.has_previous_sign_in,
            current_user: script.current_user.clone(),
            signed_out: false,
            configured: None,
            calls: Vec::new(),
        };
        Self {
            script,
            state: Mutex::new(state),
        }
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.lock().calls.clone()
    }

    /// The config passed to [`IdentityProvider::configure`], if any.
    pub fn configured(&self) -> Option<SignInConfig> {
        self.lock().configured.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: ProviderCall) -> MutexGuard<'_, State> {
        debug!(?call, "scripted provider call");
        let mut state = self.lock();
        state.calls.push(call);
        state
    }

    fn next_interactive(&self, state: &mut State) -> AuthResult<SignInResponse> {
        let index = state.next_sign_in.min(self.script.sign_in.len().saturating_sub(1));
        let scripted = self.script.sign_in.get(index).ok_or_else(|| {
            AuthError::unexpected("no scripted sign-in response").with_provider(PROVIDER_NAME)
        })?;
        state.next_sign_in += 1;

        let response = scripted.to_response(AuthError::unexpected)?;
        if let SignInResponse::Success(ref session) = response {
            state.current_user = Some(session.clone());
            state.has_previous_sign_in = true;
            state.signed_out = false;
        }
        Ok(response)
    }
}

impl IdentityProvider for ScriptedProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn configure(&self, config: &SignInConfig) -> AuthResult<()> {
        self.record(ProviderCall::Configure).configured = Some(config.clone());
        Ok(())
    }

    fn check_availability(&self) -> BoxFuture<'_, AuthResult<()>> {
        drop(self.record(ProviderCall::CheckAvailability));
        let result = match self.script.unavailable {
            Some(ref message) => {
                Err(AuthError::unavailable(message.clone()).with_provider(PROVIDER_NAME))
            }
            None => Ok(()),
        };
        Box::pin(async move { result })
    }

    fn sign_in(&self) -> BoxFuture<'_, AuthResult<SignInResponse>> {
        let result = {
            let mut state = self.record(ProviderCall::SignIn);
            self.next_interactive(&mut state)
        };
        Box::pin(async move { result })
    }

    fn sign_in_silently(&self) -> BoxFuture<'_, AuthResult<SignInResponse>> {
        let signed_out = self.record(ProviderCall::SignInSilently).signed_out;
        let result = match self.script.silent_sign_in {
            Some(ref scripted) if !signed_out => scripted.to_response(AuthError::recovery_failed),
            _ => Ok(SignInResponse::other(NO_SAVED_CREDENTIAL)),
        };
        Box::pin(async move { result })
    }

    fn has_previous_sign_in(&self) -> bool {
        self.record(ProviderCall::HasPreviousSignIn)
            .has_previous_sign_in
    }

    fn get_tokens(&self) -> BoxFuture<'_, AuthResult<CachedTokens>> {
        let signed_out = self.record(ProviderCall::GetTokens).signed_out;
        let result = if signed_out {
            Err(AuthError::recovery_failed("getTokens requires a user to be signed in")
                .with_provider(PROVIDER_NAME))
        } else if let Some(ref message) = self.script.tokens_error {
            Err(AuthError::recovery_failed(message.clone()).with_provider(PROVIDER_NAME))
        } else {
            Ok(self.script.tokens.clone().unwrap_or_default())
        };
        Box::pin(async move { result })
    }

    fn current_user(&self) -> Option<UserSession> {
        self.record(ProviderCall::CurrentUser).current_user.clone()
    }

    fn revoke_access(&self) -> BoxFuture<'_, AuthResult<()>> {
        let result = {
            let mut state = self.record(ProviderCall::RevokeAccess);
            match self.script.revoke_error {
                Some(ref message) => {
                    Err(AuthError::unexpected(message.clone()).with_provider(PROVIDER_NAME))
                }
                None => {
                    state.has_previous_sign_in = false;
                    Ok(())
                }
            }
        };
        Box::pin(async move { result })
    }

    fn sign_out(&self) -> BoxFuture<'_, AuthResult<()>> {
        let result = {
            let mut state = self.record(ProviderCall::SignOut);
            match self.script.sign_out_error {
                Some(ref message) => {
                    Err(AuthError::unexpected(message.clone()).with_provider(PROVIDER_NAME))
                }
                None => {
                    state.current_user = None;
                    state.has_previous_sign_in = false;
                    state.signed_out = true;
                    Ok(())
                }
            }
        };
        Box::pin(async move { result })
    }
}
