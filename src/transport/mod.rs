//! HTTP calling layer with manual redirect handling and cookie interception.

mod error;
mod session;

pub use error::TransportError;
pub use session::{
    MAX_REDIRECTS, RequestOptions, SessionResponse, SessionTransport, TransportConfig,
};
