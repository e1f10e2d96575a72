//! Scenario replay command.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use signin_repro_core::{LogObserver, LogSnapshot, LogStore};
use tracing::{debug, info};

use crate::analytics::init_analytics;
use crate::app::ReproApp;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::render::render_screen;
use crate::scenario::Scenario;

/// Prints each newly appended log line to stdout.
///
/// The store notifies once per change, so a delivery that does not grow the
/// snapshot (the store is at capacity) carries exactly one new line at the
/// end. Lines are never compared by text: identical callbacks logged within
/// the same millisecond are all printed.
#[derive(Debug, Default)]
pub struct FollowPrinter {
    seen: Mutex<Option<usize>>,
}

impl FollowPrinter {
    /// The lines that should be printed for `snapshot`.
    fn next_lines(&self, snapshot: &[String]) -> Vec<String> {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = seen.replace(snapshot.len());

        match previous {
            None => snapshot.to_vec(),
            Some(0) if snapshot.is_empty() => Vec::new(),
            Some(_) if snapshot.is_empty() => vec!["--- logs cleared ---".to_string()],
            Some(len) if snapshot.len() > len => snapshot[len..].to_vec(),
            Some(_) => snapshot.last().cloned().into_iter().collect(),
        }
    }
}

impl LogObserver for FollowPrinter {
    fn on_logs(&self, snapshot: LogSnapshot) {
        for line in self.next_lines(&snapshot) {
            println!("{}", line);
        }
    }
}

/// Builds a host for `scenario` with a log store sized from `config`.
pub fn open_app(config: &HarnessConfig, scenario: &Scenario) -> ReproApp {
    let logs = Arc::new(LogStore::with_capacity(config.logs.capacity));
    ReproApp::new(scenario.provider(), logs)
}

/// Replays `scenario` against a fresh host and returns it.
pub async fn replay(
    config: &HarnessConfig,
    scenario: &Scenario,
    follow: bool,
) -> HarnessResult<ReproApp> {
    let sign_in_config = config
        .google
        .to_sign_in_config()
        .map_err(HarnessError::Config)?;

    let app = open_app(config, scenario);
    let follower = follow.then(|| {
        app.logs()
            .subscribe(Arc::new(FollowPrinter::default()))
    });

    if config.analytics.enabled {
        init_analytics(&scenario.analytics(), app.logs()).await;
    }
    app.start(&sign_in_config, scenario.initial_url.as_deref())?;

    for event in &scenario.events {
        debug!(?event, "applying host event");
        if let Some(outcome) = event.apply(&app).await {
            info!(status = outcome.status(), "sign-in press finished");
        }
    }

    if let Some(follower) = follower {
        follower.unsubscribe();
    }
    Ok(app)
}

/// Runs the scenario at `path` and prints the final screen.
pub async fn run(config: &HarnessConfig, path: &Path, follow: bool) -> HarnessResult<()> {
    let scenario = Scenario::load(path)?;
    info!(
        scenario = scenario.display_name(),
        events = scenario.events.len(),
        "replaying scenario"
    );

    let app = replay(config, &scenario, follow).await?;
    if follow {
        println!();
    }
    println!("{}", render_screen(&app.screen()));
    Ok(())
}
