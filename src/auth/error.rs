//! Error types for the login flow.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors from the login sequence.
///
/// None of these are retried; a failed login restarts from the entry page.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The rendered login page held no recognizable `<form>` tag.
    ///
    /// This is the platform's main failure signature: it fires when the
    /// identity provider changes its page layout or when the entry redirect
    /// lands somewhere other than the login form.
    #[error("login form not found in the identity provider page")]
    LoginFormNotFound,

    /// The token-creation endpoint answered without a usable token value.
    #[error("CSRF token unavailable: token-creation response lacked a token value")]
    CsrfTokenUnavailable,

    /// A step's request failed at the transport level.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
