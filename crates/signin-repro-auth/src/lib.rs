//! IdentityProvider trait, sign-in reconciler and scripted provider.
//!
//! - [`IdentityProvider`] - the capability surface of a native sign-in SDK
//! - [`Reconciler`] - turns one sign-in attempt into a [`SignInOutcome`]
//! - [`ScriptedProvider`] - plays back a [`ProviderScript`] for repro runs
//! - [`AuthError`] - error taxonomy for provider operations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐    ┌──────────────────┐
//! │  native SDK      │    │  scenario file   │
//! └────────┬─────────┘    └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌──────────────────┐    ┌──────────────────┐
//! │ (host binding)   │    │ ScriptedProvider │
//! └────────┬─────────┘    └────────┬─────────┘
//!          │   IdentityProvider    │
//!          └───────────┬───────────┘
//!                      ▼
//!               ┌────────────┐      ┌──────────┐
//!               │ Reconciler │ ───▶ │ LogStore │
//!               └─────┬──────┘      └──────────┘
//!                     ▼
//!              ┌───────────────┐
//!              │ SignInOutcome │
//!              └───────────────┘
//! ```

pub mod config;
pub mod error;
pub mod outcome;
pub mod provider;
pub mod reconciler;
pub mod scripted;

pub use config::SignInConfig;
pub use error::{AuthError, AuthErrorCode, AuthResult};
pub use outcome::{SignInOutcome, SignedIn};
pub use provider::{
    BoxFuture, CachedTokens, IdentityProvider, SignInResponse, UserProfile, UserSession,
};
pub use reconciler::{Reconciler, RecoveryStrategy};
pub use scripted::{ProviderCall, ProviderScript, ScriptedProvider, ScriptedResponse};
