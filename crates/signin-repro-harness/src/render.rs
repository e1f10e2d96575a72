//! Plain-text rendering of the repro screen.

use std::fmt::Write;

use crate::app::Screen;

const TITLE: &str = "Google Sign-In Repro";
const SUBTITLE: &str = "Target issue: duplicate OAuth callback / intermittent missing idToken";

/// Renders the screen the way the app lays it out, top to bottom.
pub fn render_screen(screen: &Screen) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", TITLE);
    let _ = writeln!(out, "{}", SUBTITLE);
    let _ = writeln!(out);
    let _ = writeln!(out, "Latest callback URL (sanitized): {}", screen.latest_url);
    let _ = writeln!(
        out,
        "Current signed-in email: {}",
        screen.current_email.as_deref().unwrap_or("none")
    );
    let _ = writeln!(
        out,
        "Last result: [{}] {}",
        screen.last_result.status, screen.last_result.detail
    );
    let _ = writeln!(out);

    let button = if screen.loading {
        "Signing in..."
    } else {
        "Sign in with Google"
    };
    let _ = writeln!(out, "[ {} ] [ Clear Session ] [ Clear Logs ]", button);
    let _ = writeln!(out);

    let _ = write!(out, "Runtime Logs ({})", screen.logs.len());
    if screen.logs.is_empty() {
        let _ = write!(out, "\n  No logs yet.");
    }
    for line in &screen.logs {
        let _ = write!(out, "\n  {}", line);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::LastResult;

    fn screen(logs: Vec<&str>) -> Screen {
        Screen {
            latest_url: "none".to_string(),
            current_email: None,
            last_result: LastResult::default(),
            loading: false,
            logs: logs.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn empty_screen() {
        insta::assert_snapshot!(render_screen(&screen(vec![])), @r"
Google Sign-In Repro
Target issue: duplicate OAuth callback / intermittent missing idToken

Latest callback URL (sanitized): none
Current signed-in email: none
Last result: [idle] No sign-in attempt yet.

[ Sign in with Google ] [ Clear Session ] [ Clear Logs ]

Runtime Logs (0)
  No logs yet.
");
    }

    #[test]
    fn loading_screen_with_logs() {
        let mut screen = screen(vec![
            "2024-03-15T09:30:05.000Z [Repro][DeepLink] initial: myapp://cb?...",
            "2024-03-15T09:30:06.120Z [Repro][SignIn] Google sign-in start",
        ]);
        screen.loading = true;
        screen.latest_url = "myapp://cb?...".to_string();
        screen.current_email = Some("dev@example.com".to_string());

        let rendered = render_screen(&screen);

        assert!(rendered.contains("[ Signing in... ]"));
        assert!(rendered.contains("Current signed-in email: dev@example.com"));
        assert!(rendered.ends_with("[Repro][SignIn] Google sign-in start"));
        assert!(!rendered.contains("No logs yet."));
    }
}
