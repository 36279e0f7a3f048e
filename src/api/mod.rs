//! Authenticated API calls layered on the session transport.
//!
//! Thin request shapers: read the CSRF cookie from the session store, build a
//! query or form body, issue one transport call and unwrap the platform's
//! `{ "response": ... }` JSON envelope. No new state or control flow lives
//! here.

pub mod account;
mod error;
pub mod mail;

pub use error::ApiError;
pub use mail::{MailFolder, MailQuery, SortOrder};
