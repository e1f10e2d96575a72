//! Analytics start-up.
//!
//! The repro app enables analytics collection and emits a single
//! `repro_app_open` event at launch. Failures are logged and otherwise
//! ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use signin_repro_auth::BoxFuture;
use signin_repro_core::LogStore;
use thiserror::Error;
use tracing::info;

/// Event emitted once at start-up.
pub const APP_OPEN_EVENT: &str = "repro_app_open";

/// An analytics backend failure.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct AnalyticsError(pub String);

/// Analytics reporting backend.
pub trait Analytics: Send + Sync {
    /// Turns collection on or off.
    fn set_collection_enabled(&self, enabled: bool) -> BoxFuture<'_, Result<(), AnalyticsError>>;

    /// Emits a named event.
    fn log_event(&self, name: String) -> BoxFuture<'_, Result<(), AnalyticsError>>;
}

/// Enables collection, emits [`APP_OPEN_EVENT`] and logs the result.
pub async fn init_analytics(analytics: &dyn Analytics, logs: &LogStore) {
    let result = async {
        analytics.set_collection_enabled(true).await?;
        analytics.log_event(APP_OPEN_EVENT.to_string()).await
    }
    .await;

    match result {
        Ok(()) => logs.append("[Repro][Firebase] Analytics initialized"),
        Err(err) => logs.append(format!("[Repro][Firebase] Initialization failed: {}", err)),
    }
}

/// In-process backend: records events and reports them through `tracing`.
///
/// With `failure` set, every call fails with that message.
#[derive(Debug, Default)]
pub struct LocalAnalytics {
    failure: Option<String>,
    enabled: AtomicBool,
    events: Mutex<Vec<String>>,
}

impl LocalAnalytics {
    /// Creates a working backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose calls all fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Whether collection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Events recorded so far.
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check(&self) -> Result<(), AnalyticsError> {
        match self.failure {
            Some(ref message) => Err(AnalyticsError(message.clone())),
            None => Ok(()),
        }
    }
}

impl Analytics for LocalAnalytics {
    fn set_collection_enabled(&self, enabled: bool) -> BoxFuture<'_, Result<(), AnalyticsError>> {
        Box::pin(async move {
            self.check()?;
            self.enabled.store(enabled, Ordering::SeqCst);
            info!(enabled, "analytics collection toggled");
            Ok(())
        })
    }

    fn log_event(&self, name: String) -> BoxFuture<'_, Result<(), AnalyticsError>> {
        Box::pin(async move {
            self.check()?;
            info!(event = %name, "analytics event");
            self.events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(name);
            Ok(())
        })
    }
}
