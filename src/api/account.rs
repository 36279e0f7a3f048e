//! Account and profile reads.

use reqwest::header::{HeaderMap, REFERER};
use serde_json::Value;
use tracing::instrument;

use crate::constants::url_header_value;
use crate::endpoints::Endpoints;
use crate::transport::SessionTransport;

use super::error::ApiError;

/// Fetches the authenticated user's information from the portal's OAuth2
/// userinfo endpoint.
///
/// # Errors
///
/// [`ApiError::UnexpectedEnvelope`] when the reply is not JSON and
/// [`ApiError::Transport`] for wire failures.
#[instrument(level = "debug", skip_all)]
pub async fn fetch_user_info(
    transport: &mut SessionTransport,
    endpoints: &Endpoints,
) -> Result<Value, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(REFERER, url_header_value(endpoints.ent_base_url.as_str()));

    let response = transport
        .get(
            &format!("{}auth/oauth2/userinfo", endpoints.ent_base_url),
            Some(headers),
        )
        .await?;

    response.json().map_err(|_| ApiError::UnexpectedEnvelope {
        endpoint: "auth/oauth2/userinfo",
    })
}

/// Fetches the user's profile from the identity portal.
///
/// The `typeLabel` field may contain U+FFFD replacement characters: the
/// server mangles the field's encoding upstream, and that corrupted text is
/// the authoritative payload, so it is passed through unmodified.
///
/// # Errors
///
/// [`ApiError::UnexpectedEnvelope`] when the reply is not JSON and
/// [`ApiError::Transport`] for wire failures.
#[instrument(level = "debug", skip_all)]
pub async fn fetch_profile(
    transport: &mut SessionTransport,
    endpoints: &Endpoints,
) -> Result<Value, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(REFERER, url_header_value(endpoints.psn_base_url.as_str()));

    let response = transport
        .get(
            &format!("{}user/profile", endpoints.psn_base_url),
            Some(headers),
        )
        .await?;

    response.json().map_err(|_| ApiError::UnexpectedEnvelope {
        endpoint: "user/profile",
    })
}
