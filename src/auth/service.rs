//! The six-step login sequence.
//!
//! Each step depends on cookie and header state left by its predecessor, so
//! the order is fixed and no step is skippable or retried. A failure anywhere
//! means the caller restarts from the entry page; there is no partial-login
//! resumability.

use std::fmt;

use reqwest::Method;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::form_urlencoded;

use crate::constants::{CSRF_COOKIE_NAME, url_header_value};
use crate::cookie::Cookie;
use crate::endpoints::Endpoints;
use crate::transport::{RequestOptions, SessionTransport};

use super::error::AuthError;
use super::scrape::extract_form_action;

/// Username/password pair, supplied per login call and not retained.
///
/// The password is redacted in Debug output.
#[derive(Clone)]
pub struct Credentials {
    /// Platform account name.
    pub username: String,
    /// Account password (sensitive - never log).
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the password.
    ///
    /// Passwords are sensitive - avoid logging the return value.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Custom Debug impl that redacts the password.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokenEnvelope {
    #[serde(default)]
    response: TokenBody,
}

#[derive(Debug, Default, Deserialize)]
struct TokenBody {
    #[serde(rename = "tokenValue")]
    token_value: Option<String>,
}

/// Runs the full login sequence against the platform.
///
/// On success the transport's cookie jar holds every cookie subsequent
/// authenticated calls need, including the synthetic `CSRF_TOKEN`; there is
/// no payload to return.
///
/// # Errors
///
/// [`AuthError::LoginFormNotFound`] when the entry page holds no form (before
/// any credential is sent), [`AuthError::CsrfTokenUnavailable`] when the
/// token handshake yields no token, and [`AuthError::Transport`] when any
/// step fails on the wire.
#[instrument(skip_all, fields(username = %credentials.username))]
pub async fn login(
    transport: &mut SessionTransport,
    endpoints: &Endpoints,
    credentials: &Credentials,
) -> Result<(), AuthError> {
    // Step 1: entry page. The identity provider bounces through its own
    // redirect chain before rendering the login form.
    let entry = transport
        .follow_redirects(endpoints.psn_base_url.as_str(), RequestOptions::default())
        .await?;
    let html = entry.text();

    // Step 2: scrape the form action before touching the credentials.
    let form_action = extract_form_action(&html).ok_or(AuthError::LoginFormNotFound)?;
    debug!("login form action extracted");

    // Step 3: submit credentials. The provider serves the form from a
    // sandboxed context, so the Origin it expects is the literal "null".
    let login_body = form_urlencoded::Serializer::new(String::new())
        .append_pair("username", &credentials.username)
        .append_pair("password", credentials.password())
        .append_pair("credentialId", "")
        .finish();

    let mut login_headers = HeaderMap::new();
    login_headers.insert(ORIGIN, HeaderValue::from_static("null"));
    login_headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    login_headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );

    transport
        .follow_redirects(
            &form_action,
            RequestOptions {
                method: Method::POST,
                body: Some(login_body),
                headers: login_headers,
            },
        )
        .await?;
    debug!("credentials submitted");

    // Step 4: version probe, purely for session routing. Without a token yet
    // the API answers its 481/CSRFTOKEN_INVALID envelope; that is the
    // documented behavior at this stage, not a failure.
    let handshake = handshake_headers(endpoints);
    transport
        .post(
            &format!("{}getVersion.json", endpoints.webmail_api_url),
            "",
            Some(handshake.clone()),
        )
        .await?;

    // Step 5: mint the CSRF token and store it as a synthetic cookie scoped
    // to the mail API's parent domain.
    let token_response = transport
        .post(
            &format!("{}createToken.json", endpoints.webmail_api_url),
            "",
            Some(handshake),
        )
        .await?;
    let token = token_response
        .json::<TokenEnvelope>()
        .ok()
        .and_then(|envelope| envelope.response.token_value)
        .ok_or(AuthError::CsrfTokenUnavailable)?;

    let origin_host = endpoints
        .webmail_api_url
        .host_str()
        .unwrap_or_default()
        .to_string();
    let index = transport.cookie_jar_mut().next_creation_index();
    let mut csrf_cookie = Cookie::new(CSRF_COOKIE_NAME, token, origin_host, index);
    csrf_cookie.domain = Some(endpoints.session_cookie_domain.clone());
    transport.cookie_jar_mut().add_cookie(csrf_cookie);
    debug!("CSRF token stored");

    // Step 6: the OpenID callback finalizes the session on the portal domain.
    let callback_url = format!(
        "{}auth/openid/login?callBack={}",
        endpoints.ent_base_url,
        urlencoding::encode(&format!("{}welcome", endpoints.ent_base_url)),
    );
    let mut callback_headers = HeaderMap::new();
    callback_headers.insert(REFERER, url_header_value(endpoints.psn_base_url.as_str()));
    transport
        .follow_redirects(
            &callback_url,
            RequestOptions {
                headers: callback_headers,
                ..RequestOptions::default()
            },
        )
        .await?;

    info!("login complete");
    Ok(())
}

/// Referer/Origin pointing at the identity portal, which the webmail API
/// requires during the token handshake.
fn handshake_headers(endpoints: &Endpoints) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(REFERER, url_header_value(endpoints.psn_base_url.as_str()));
    headers.insert(
        ORIGIN,
        url_header_value(&endpoints.psn_base_url.origin().ascii_serialization()),
    );
    headers
}
