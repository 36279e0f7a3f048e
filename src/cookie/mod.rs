//! RFC-6265-style cookie storage scoped to one session.

mod jar;

pub use jar::{Cookie, CookieJar};
