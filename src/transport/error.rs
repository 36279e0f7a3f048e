//! Error types for the session transport.

use thiserror::Error;

/// Errors from the HTTP transport layer.
///
/// Non-2xx responses are not transport errors; callers inspect the returned
/// status instead. Nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level failure (DNS resolution, connection, TLS, timeout, body
    /// read).
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL the request targeted.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The supplied URL, or a redirect Location resolved from it, is not a
    /// valid URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// A redirect chain exceeded the transport's fixed hop ceiling.
    #[error("too many redirects starting from {url} (limit {limit})")]
    TooManyRedirects {
        /// The URL the chain started from.
        url: String,
        /// The hop ceiling that was exceeded.
        limit: usize,
    },
}

impl TransportError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a redirect-ceiling error.
    pub fn too_many_redirects(url: impl Into<String>, limit: usize) -> Self {
        Self::TooManyRedirects {
            url: url.into(),
            limit,
        }
    }
}
