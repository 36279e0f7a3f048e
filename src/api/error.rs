//! Error types for the authenticated API surface.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors from authenticated mail and account calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No `CSRF_TOKEN` cookie in the session store: login has not completed
    /// on this session.
    #[error("missing CSRF_TOKEN session cookie; call login() first")]
    CsrfCookieMissing,

    /// The endpoint's JSON reply did not have the expected envelope shape.
    #[error("unexpected response envelope from {endpoint}")]
    UnexpectedEnvelope {
        /// Endpoint leaf that produced the malformed reply.
        endpoint: &'static str,
    },

    /// The underlying request failed at the transport level.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csrf_cookie_missing_display() {
        let msg = ApiError::CsrfCookieMissing.to_string();
        assert!(msg.contains("CSRF_TOKEN"), "Expected cookie name in: {msg}");
        assert!(msg.contains("login()"), "Expected remediation hint in: {msg}");
    }

    #[test]
    fn test_unexpected_envelope_names_endpoint() {
        let error = ApiError::UnexpectedEnvelope {
            endpoint: "getMailHeaderList.json",
        };
        assert!(error.to_string().contains("getMailHeaderList.json"));
    }
}
