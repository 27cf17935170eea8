//! Channel URL or login resolution.

use once_cell::sync::Lazy;
use regex::Regex;

static CHANNEL_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:https?://)?(?:(?:www|go|m)\.)?twitch\.tv/(?P<login>[a-zA-Z0-9_]{4,25})")
        .expect("channel URL pattern is valid")
});

/// Extracts the login from a channel URL, or returns the input as-is when
/// it does not look like one.
pub fn broadcaster_login(url_or_login: &str) -> &str {
    let input = url_or_login.trim();
    CHANNEL_URL
        .captures(input)
        .and_then(|caps| caps.name("login"))
        .map(|m| m.as_str())
        .unwrap_or(input)
}
