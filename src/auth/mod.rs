//! Authentication orchestration for the platform's multi-step login flow.

mod error;
mod scrape;
mod service;

pub use error::AuthError;
pub use scrape::extract_form_action;
pub use service::{Credentials, login};
