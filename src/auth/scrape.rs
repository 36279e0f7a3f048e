//! Login-form action extraction from scraped portal HTML.
//!
//! Deliberately not an HTML parser: the identity provider's login page is the
//! only input this will ever see, so the whole contract is a narrow
//! pattern-match-or-fail on the first form tag.

use std::sync::OnceLock;

use regex::Regex;

#[allow(clippy::expect_used)]
fn form_action_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<form[^>]+action="([^"]+)""#).expect("form action pattern is valid")
    })
}

/// Extracts the first form's submission URL from login page HTML.
///
/// Scans for the first `<form ... action="...">` attribute and unescapes
/// `&amp;` entities (the provider HTML-escapes its query strings). Returns
/// `None` when the page holds no such form, which the login flow surfaces as
/// [`AuthError::LoginFormNotFound`](super::AuthError::LoginFormNotFound).
#[must_use]
pub fn extract_form_action(html: &str) -> Option<String> {
    form_action_pattern()
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|action| action.as_str().replace("&amp;", "&"))
}
