//! MonLycée ENT Client Library
//!
//! Session-aware HTTP client for the MonLycée platform: authenticates through
//! the identity provider's screen-scraped login form, bootstraps a CSRF token
//! with the webmail API's two-call handshake, and keeps cookie state across
//! subsequent mail and account calls.
//!
//! # Architecture
//!
//! - [`cookie`] - in-memory RFC-6265-style cookie store with the platform's
//!   domain/path/security matching rules
//! - [`transport`] - HTTP pipeline that attaches/collects cookies around every
//!   request and follows redirects with browser-compatible method downgrades
//! - [`auth`] - the six-step login orchestration
//! - [`api`] - mail and account calls layered on the authenticated session
//! - [`client`] - one-stop facade owning a single session
//!
//! One [`MonLyceeClient`] is one logical user session; create one per user and
//! do not share it across concurrent logins.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod client;
pub mod constants;
pub mod cookie;
pub mod endpoints;
pub mod transport;

// Re-export commonly used types
pub use api::{ApiError, MailFolder, MailQuery, SortOrder};
pub use auth::{AuthError, Credentials};
pub use client::MonLyceeClient;
pub use cookie::{Cookie, CookieJar};
pub use endpoints::Endpoints;
pub use transport::{
    RequestOptions, SessionResponse, SessionTransport, TransportConfig, TransportError,
};
