//! Repeated sign-in presses.

use std::path::Path;

use serde_json::json;
use signin_repro_auth::SignInOutcome;
use tracing::info;

use crate::app::LastResult;
use crate::commands::run::open_app;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::scenario::Scenario;

/// Presses sign-in `attempts` times and returns the outcomes.
pub async fn press(
    config: &HarnessConfig,
    scenario: &Scenario,
    attempts: usize,
) -> HarnessResult<Vec<SignInOutcome>> {
    let sign_in_config = config
        .google
        .to_sign_in_config()
        .map_err(HarnessError::Config)?;

    let app = open_app(config, scenario);
    app.start(&sign_in_config, None)?;

    let mut outcomes = Vec::with_capacity(attempts);
    for attempt in 1..=attempts {
        if let Some(outcome) = app.press_sign_in().await {
            info!(attempt, status = outcome.status(), "sign-in attempt finished");
            outcomes.push(outcome);
        }
    }
    Ok(outcomes)
}

/// One line per outcome.
pub fn summary(attempt: usize, outcome: &SignInOutcome) -> String {
    let result = LastResult::from_outcome(outcome);
    format!("attempt {}: [{}] {}", attempt, result.status, result.detail)
}

/// Runs the `sign-in` command.
pub async fn sign_in(
    config: &HarnessConfig,
    path: &Path,
    attempts: usize,
    as_json: bool,
) -> HarnessResult<()> {
    let scenario = Scenario::load(path)?;
    let outcomes = press(config, &scenario, attempts).await?;

    for (index, outcome) in outcomes.iter().enumerate() {
        let attempt = index + 1;
        if as_json {
            let result = LastResult::from_outcome(outcome);
            let line = json!({
                "attempt": attempt,
                "status": result.status.as_str(),
                "detail": result.detail,
                "idTokenLength": outcome.id_token().map(str::len),
            });
            println!("{}", line);
        } else {
            println!("{}", summary(attempt, outcome));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_scripted_response_repeats() {
        let scenario = Scenario::parse(
            r#"
[provider]
sign_in = [
    { type = "cancelled" },
    { type = "other", kind = "noSavedCredentialFound" },
]
"#,
        )
        .unwrap();

        let outcomes = press(&HarnessConfig::default(), &scenario, 3)
            .await
            .unwrap();

        let summaries: Vec<String> = outcomes
            .iter()
            .enumerate()
            .map(|(i, o)| summary(i + 1, o))
            .collect();
        assert_eq!(
            summaries,
            vec![
                "attempt 1: [cancelled] cancelled",
                "attempt 2: [no-id-token] no-id-token (noSavedCredentialFound)",
                "attempt 3: [no-id-token] no-id-token (noSavedCredentialFound)",
            ]
        );
    }

    #[tokio::test]
    async fn zero_attempts_is_empty() {
        let outcomes = press(&HarnessConfig::default(), &Scenario::default(), 0)
            .await
            .unwrap();
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn runs_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cancel.toml");
        std::fs::write(&path, "[provider]\nsign_in = [{ type = \"cancelled\" }]\n").unwrap();

        assert!(sign_in(&HarnessConfig::default(), &path, 2, true).await.is_ok());
    }
}
