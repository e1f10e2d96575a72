//! The repro host.
//!
//! [`ReproApp`] plays the role of the single screen of the repro app: it owns
//! the sign-in button's loading state, the last result, the latest callback
//! URL and a live copy of the diagnostic log.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use signin_repro_auth::{IdentityProvider, Reconciler, SignInConfig, SignInOutcome};
use signin_repro_core::{CallbackSource, LogSnapshot, LogStore, Subscription, sanitize_url};
use tracing::{debug, warn};

use crate::error::HarnessResult;
use crate::lifecycle::AppState;

/// Status shown in the "Last result" card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    /// No attempt yet, or the session was cleared.
    Idle,
    /// An ID token was obtained.
    Success,
    /// The user dismissed the sheet and nothing was recovered.
    Cancelled,
    /// The response carried no ID token and nothing was recovered.
    NoIdToken,
    /// The attempt failed.
    Error,
}

impl ResultStatus {
    /// Label shown on screen.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Success => "success",
            Self::Cancelled => "cancelled",
            Self::NoIdToken => "no-id-token",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status plus a human-readable summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastResult {
    /// Outcome category.
    pub status: ResultStatus,
    /// Summary line.
    pub detail: String,
}

impl LastResult {
    /// An idle result with the given detail.
    pub fn idle(detail: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Idle,
            detail: detail.into(),
        }
    }

    /// Summarizes a sign-in outcome.
    pub fn from_outcome(outcome: &SignInOutcome) -> Self {
        match outcome {
            SignInOutcome::Success(signed_in) => Self {
                status: ResultStatus::Success,
                detail: format!(
                    "success (success), idTokenLength={}",
                    signed_in.token_len()
                ),
            },
            SignInOutcome::Cancelled => Self {
                status: ResultStatus::Cancelled,
                detail: "cancelled".to_string(),
            },
            SignInOutcome::NoIdToken { response_kind } => Self {
                status: ResultStatus::NoIdToken,
                detail: format!("no-id-token ({})", response_kind),
            },
            SignInOutcome::Error { message } => Self {
                status: ResultStatus::Error,
                detail: message.clone(),
            },
        }
    }
}

impl Default for LastResult {
    fn default() -> Self {
        Self::idle("No sign-in attempt yet.")
    }
}

/// Everything the screen displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    /// Latest sanitized callback URL, `none` before the first one.
    pub latest_url: String,
    /// Email of the provider's cached current user.
    pub current_email: Option<String>,
    /// The "Last result" card.
    pub last_result: LastResult,
    /// Whether the sign-in button is disabled.
    pub loading: bool,
    /// Diagnostic log lines, oldest first.
    pub logs: Vec<String>,
}

#[derive(Debug, Default)]
struct ViewState {
    last_result: LastResult,
    latest_url: Option<String>,
    link_url: Option<String>,
}

/// The repro screen's state and handlers.
pub struct ReproApp {
    logs: Arc<LogStore>,
    reconciler: Reconciler,
    loading: AtomicBool,
    view: Mutex<ViewState>,
    screen_logs: Arc<Mutex<LogSnapshot>>,
    subscription: Option<Subscription>,
}

impl fmt::Debug for ReproApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReproApp")
            .field("reconciler", &self.reconciler)
            .field("loading", &self.is_loading())
            .finish()
    }
}

/// Clears the loading flag when the sign-in handler exits, whichever path
/// it takes.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ReproApp {
    /// Creates the host and subscribes it to `logs`.
    pub fn new(provider: Arc<dyn IdentityProvider>, logs: Arc<LogStore>) -> Self {
        let screen_logs: Arc<Mutex<LogSnapshot>> = Arc::new(Mutex::new(Arc::from(Vec::new())));

        let sink = Arc::clone(&screen_logs);
        let subscription = logs.subscribe(Arc::new(move |snapshot: LogSnapshot| {
            *sink.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
        }));

        Self {
            reconciler: Reconciler::new(provider, Arc::clone(&logs)),
            logs,
            loading: AtomicBool::new(false),
            view: Mutex::new(ViewState::default()),
            screen_logs,
            subscription: Some(subscription),
        }
    }

    /// Configures the provider and records the launch URL.
    pub fn start(&self, config: &SignInConfig, launch_url: Option<&str>) -> HarnessResult<()> {
        if let Err(err) = self.reconciler.configure(config) {
            self.logs
                .append(format!("[Repro][SignIn] configure failed: {}", err));
            return Err(err.into());
        }
        self.incoming_url(CallbackSource::Initial, launch_url);
        Ok(())
    }

    /// The shared log store.
    pub fn logs(&self) -> &Arc<LogStore> {
        &self.logs
    }

    /// The reconciler behind the sign-in button.
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Whether a sign-in attempt is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Handles the sign-in button.
    ///
    /// Returns `None` without doing anything if an attempt is already
    /// outstanding.
    pub async fn press_sign_in(&self) -> Option<SignInOutcome> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sign-in already in progress, ignoring press");
            return None;
        }
        let _guard = LoadingGuard(&self.loading);

        self.logs.append("[Repro][SignIn] Google sign-in start");
        let outcome = self.reconciler.attempt_sign_in().await;

        match outcome {
            SignInOutcome::Success(ref signed_in) => self.logs.append(format!(
                "[Repro][SignIn] success type=success email={} idTokenLength={}",
                signed_in.email_or_none(),
                signed_in.token_len()
            )),
            SignInOutcome::Cancelled => self.logs.append("[Repro][SignIn] cancelled"),
            SignInOutcome::NoIdToken { ref response_kind } => self.logs.append(format!(
                "[Repro][SignIn] no-id-token responseType={}",
                response_kind
            )),
            SignInOutcome::Error { ref message } => {
                warn!(%message, "sign-in attempt failed");
                self.logs.append(format!("[Repro][SignIn] ERROR {}", message))
            }
        }

        self.view().last_result = LastResult::from_outcome(&outcome);
        Some(outcome)
    }

    /// Handles the "Clear Session" button.
    pub async fn press_clear_session(&self) {
        self.reconciler.clear_session().await;
        self.logs.append("[Repro][SignIn] Session cleared");
        self.view().last_result = LastResult::idle("Session cleared");
    }

    /// Handles the "Clear Logs" button.
    pub fn press_clear_logs(&self) {
        self.logs.clear();
        self.logs.append("[Repro] Logs cleared");
    }

    /// Records a URL delivered to the app. `None` is ignored.
    pub fn incoming_url(&self, source: CallbackSource, url: Option<&str>) {
        let Some(url) = url else {
            return;
        };

        let sanitized = sanitize_url(url);
        {
            let mut view = self.view();
            if source == CallbackSource::Initial {
                view.link_url = Some(url.to_string());
            }
            view.latest_url = Some(sanitized.clone());
        }
        self.logs
            .append(format!("[Repro][DeepLink] {}: {}", source, sanitized));
    }

    /// Records a lifecycle transition. Returning to the foreground re-reads
    /// the launch URL.
    pub fn app_state_changed(&self, state: AppState) {
        self.logs.append(format!("[Repro][AppState] {}", state));

        if state == AppState::Active {
            let link = self.view().link_url.clone();
            self.incoming_url(CallbackSource::Foreground, link.as_deref());
        }
    }

    /// Email of the provider's cached current user.
    pub fn current_user_email(&self) -> Option<String> {
        self.reconciler.current_signed_in_email()
    }

    /// The last result card.
    pub fn last_result(&self) -> LastResult {
        self.view().last_result.clone()
    }

    /// The latest sanitized callback URL, `none` if nothing arrived yet.
    pub fn latest_url(&self) -> String {
        self.view()
            .latest_url
            .clone()
            .unwrap_or_else(|| "none".to_string())
    }

    /// Lines as last delivered to the screen's subscription.
    pub fn screen_logs(&self) -> LogSnapshot {
        Arc::clone(&self.screen_logs.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Current view model.
    pub fn screen(&self) -> Screen {
        Screen {
            latest_url: self.latest_url(),
            current_email: self.current_user_email(),
            last_result: self.last_result(),
            loading: self.is_loading(),
            logs: self.screen_logs().to_vec(),
        }
    }

    fn view(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ReproApp {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
