//! Callback URL handling for display.
//!
//! OAuth callbacks carry codes and state in their query string. Nothing here
//! parses or routes them; the query is dropped before a URL is shown or logged.

use std::fmt;

/// Replaces everything after the first `?` with `...`.
///
/// ```
/// use signin_repro_core::links::sanitize_url;
///
/// assert_eq!(
///     sanitize_url("com.example.app:/oauth2redirect?code=abc&state=xyz"),
///     "com.example.app:/oauth2redirect?..."
/// );
/// assert_eq!(sanitize_url("https://example.com/path"), "https://example.com/path");
/// ```
pub fn sanitize_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{base}?..."),
        None => url.to_string(),
    }
}

/// Where an incoming URL was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackSource {
    /// The URL the process was launched with.
    Initial,
    /// A URL delivered while running.
    Event,
    /// The launch URL re-read when the app returned to the foreground.
    Foreground,
}

impl CallbackSource {
    /// Label used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Event => "event",
            Self::Foreground => "foreground",
        }
    }
}

impl fmt::Display for CallbackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_query_string() {
        assert_eq!(
            sanitize_url("myapp://callback?code=4/0Ab&scope=email"),
            "myapp://callback?..."
        );
    }

    #[test]
    fn keeps_url_without_query() {
        assert_eq!(sanitize_url("myapp://callback"), "myapp://callback");
        assert_eq!(sanitize_url(""), "");
    }

    #[test]
    fn strips_from_first_question_mark() {
        assert_eq!(sanitize_url("a?b?c"), "a?...");
        assert_eq!(sanitize_url("?only"), "?...");
        assert_eq!(sanitize_url("trailing?"), "trailing?...");
    }

    #[test]
    fn fragment_after_query_is_dropped_too() {
        assert_eq!(
            sanitize_url("https://example.com/cb?code=1#frag"),
            "https://example.com/cb?..."
        );
    }

    #[test]
    fn callback_source_labels() {
        assert_eq!(CallbackSource::Initial.to_string(), "initial");
        assert_eq!(CallbackSource::Event.as_str(), "event");
        assert_eq!(CallbackSource::Foreground.as_str(), "foreground");
    }
}
