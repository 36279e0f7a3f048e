//! Fixed request constants the platform fingerprints clients on.
//!
//! The identity provider and webmail API expect a browser-shaped header set;
//! these values are configuration constants, never computed or negotiated.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Name of the session cookie carrying the webmail CSRF token.
///
/// Written by the login flow after the token handshake, read by every
/// authenticated mail call.
pub const CSRF_COOKIE_NAME: &str = "CSRF_TOKEN";

/// Browser-fingerprint header set attached to every outbound request.
///
/// Accept-Encoding is intentionally absent so reqwest's content-encoding
/// negotiation stays in charge of decompression.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("accept-language", "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("priority", "u=0, i"),
    (
        "sec-ch-ua",
        "\"Google Chrome\";v=\"143\", \"Chromium\";v=\"143\", \"Not A(Brand\";v=\"24\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "same-origin"),
    ("sec-fetch-user", "?1"),
    ("upgrade-insecure-requests", "1"),
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36",
    ),
];

/// Builds the default header map for the transport's HTTP client.
#[must_use]
pub fn default_header_map() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(DEFAULT_HEADERS.len());
    for &(name, value) in DEFAULT_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    headers
}

/// Builds a header value from a URL string.
///
/// URL serialization is ASCII without control characters, so this cannot fail
/// for the endpoint URLs it is used with.
#[allow(clippy::expect_used)]
pub(crate) fn url_header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).expect("URL serialization is a valid header value")
}
