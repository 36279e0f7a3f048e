//! Session transport: one shared HTTP client per logical user session.
//!
//! Automatic redirects are disabled so the login flow can inspect
//! intermediate responses. Cookies are attached before every send and
//! collected after every receive through the session's [`CookieJar`];
//! redirect following implements browser-compatible method downgrades per
//! status code.

use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue, LOCATION, SET_COOKIE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::constants::default_header_map;
use crate::cookie::CookieJar;

use super::error::TransportError;

/// Redirect hop ceiling. Fixed per transport, never configurable per call.
pub const MAX_REDIRECTS: usize = 20;

/// Cookie name the portal framework issues for double-submit CSRF.
const XSRF_COOKIE_NAME: &str = "XSRF-TOKEN";
/// Request header mirroring [`XSRF_COOKIE_NAME`].
const XSRF_HEADER_NAME: &str = "x-xsrf-token";

/// Transport configuration, immutable after construction.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Lowest TLS version accepted when negotiating connections.
    pub min_tls_version: reqwest::tls::Version,
    /// TCP keep-alive probe interval for pooled connections.
    pub tcp_keepalive: Duration,
    /// Redirect hop ceiling for [`SessionTransport::follow_redirects`].
    pub max_redirects: usize,
    /// Host whose requests mirror a stored `XSRF-TOKEN` cookie into an
    /// `X-XSRF-TOKEN` header (the portal framework's double-submit default).
    pub xsrf_mirror_host: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            min_tls_version: reqwest::tls::Version::TLS_1_2,
            tcp_keepalive: Duration::from_secs(60),
            max_redirects: MAX_REDIRECTS,
            xsrf_mirror_host: "ent.monlycee.net".to_string(),
        }
    }
}

/// Options for a [`SessionTransport::follow_redirects`] chain.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Initial request method. Defaults to GET.
    pub method: Method,
    /// Initial request body; dropped when a hop downgrades to GET.
    pub body: Option<String>,
    /// Extra headers applied on every hop, overriding transport defaults.
    pub headers: HeaderMap,
}

/// A fully-read HTTP response from the session transport.
#[derive(Debug)]
pub struct SessionResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Vec<u8>,
}

impl SessionResponse {
    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Final URL of the response (the last hop when redirects were followed).
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Raw response body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Response body as text. Invalid UTF-8 is replaced rather than rejected,
    /// matching what a browser renders for the platform's occasionally
    /// mis-encoded pages.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// HTTP transport for one logical user session.
///
/// Owns the session's [`CookieJar`] exclusively. All mutation happens through
/// `&mut self`, which makes the one-session-one-transport ownership rule a
/// compile-time property instead of a locking discipline.
#[derive(Debug)]
pub struct SessionTransport {
    client: Client,
    jar: CookieJar,
    config: TransportConfig,
}

impl Default for SessionTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTransport {
    /// Creates a transport with default configuration: TLS 1.2 minimum,
    /// keep-alive connections, automatic redirects disabled and the
    /// browser-fingerprint default headers attached to every request.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Creates a transport with explicit configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_config(config: TransportConfig) -> Self {
        let client = Client::builder()
            .min_tls_version(config.min_tls_version)
            .tcp_keepalive(config.tcp_keepalive)
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(default_header_map())
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            jar: CookieJar::new(),
            config,
        }
    }

    /// Shared access to the session's cookie store.
    #[must_use]
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.jar
    }

    /// Mutable access to the session's cookie store, for synthetic cookies.
    pub fn cookie_jar_mut(&mut self) -> &mut CookieJar {
        &mut self.jar
    }

    /// Issues a single request without following redirects.
    ///
    /// Before the send, the jar's matching cookies are attached as the Cookie
    /// header (omitted entirely when nothing matches), and on the configured
    /// mirror host a stored `XSRF-TOKEN` cookie is echoed into
    /// `X-XSRF-TOKEN`. After the receive, every Set-Cookie value is folded
    /// back into the jar with the request's target host as origin.
    ///
    /// Any HTTP status is returned as-is; only network-level failures are
    /// errors, and nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] for an unparsable URL and
    /// [`TransportError::Network`] for connection, TLS or body-read failures.
    #[instrument(level = "debug", skip(self, body, headers))]
    pub async fn request(
        &mut self,
        method: Method,
        url: &str,
        body: Option<String>,
        headers: Option<HeaderMap>,
    ) -> Result<SessionResponse, TransportError> {
        let parsed_url = Url::parse(url).map_err(|_| TransportError::invalid_url(url))?;

        let mut request = self.client.request(method, parsed_url.clone());
        if let Some(extra) = headers {
            request = request.headers(extra);
        }
        if let Some(cookie_header) = self.jar.header_for(&parsed_url) {
            request = request.header(COOKIE, cookie_header);
        }
        if let Some(token) = self.xsrf_mirror_value(&parsed_url) {
            request = request.header(HeaderName::from_static(XSRF_HEADER_NAME), token);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::network(url, e))?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let final_url = response.url().clone();
        self.capture_cookies(&response_headers, &final_url);

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(url, e))?
            .to_vec();

        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            "response received"
        );

        Ok(SessionResponse {
            status,
            headers: response_headers,
            url: final_url,
            body,
        })
    }

    /// Convenience GET without redirect following.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`request`](Self::request).
    pub async fn get(
        &mut self,
        url: &str,
        headers: Option<HeaderMap>,
    ) -> Result<SessionResponse, TransportError> {
        self.request(Method::GET, url, None, headers).await
    }

    /// Convenience POST without redirect following.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`request`](Self::request).
    pub async fn post(
        &mut self,
        url: &str,
        body: impl Into<String>,
        headers: Option<HeaderMap>,
    ) -> Result<SessionResponse, TransportError> {
        self.request(Method::POST, url, Some(body.into()), headers)
            .await
    }

    /// Issues requests starting at `url`, following redirects manually.
    ///
    /// A response redirects when its status is in [300, 400) and it carries a
    /// Location header; a 3xx without Location is returned as-is. On 301, 302
    /// and 303 the next hop is downgraded to GET and the body is dropped; 307
    /// and 308 preserve method and body. Location is resolved relative to the
    /// current URL. The first non-redirect response is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::TooManyRedirects`] once the fixed hop
    /// ceiling is exhausted, plus the errors of [`request`](Self::request).
    #[instrument(level = "debug", skip(self, options))]
    pub async fn follow_redirects(
        &mut self,
        url: &str,
        options: RequestOptions,
    ) -> Result<SessionResponse, TransportError> {
        let mut current_url = url.to_string();
        let mut method = options.method;
        let mut body = options.body;

        for _hop in 0..self.config.max_redirects {
            let response = self
                .request(
                    method.clone(),
                    &current_url,
                    body.clone(),
                    Some(options.headers.clone()),
                )
                .await?;

            let Some(location) = redirect_location(&response) else {
                return Ok(response);
            };

            let next_url = response
                .url()
                .join(&location)
                .map_err(|_| TransportError::invalid_url(location.clone()))?;
            debug!(
                status = response.status().as_u16(),
                location = %next_url,
                "following redirect"
            );

            // Browser-compatible downgrade: 301/302/303 turn the next hop
            // into a bodiless GET; 307/308 keep method and body.
            if matches!(response.status().as_u16(), 301 | 302 | 303) {
                method = Method::GET;
                body = None;
            }
            current_url = next_url.to_string();
        }

        warn!(url, limit = self.config.max_redirects, "redirect ceiling exhausted");
        Err(TransportError::too_many_redirects(
            url,
            self.config.max_redirects,
        ))
    }

    /// Double-submit mirror: on the configured portal host, a stored
    /// `XSRF-TOKEN` cookie eligible for the URL is echoed as a header value.
    fn xsrf_mirror_value(&self, url: &Url) -> Option<HeaderValue> {
        if url.host_str() != Some(self.config.xsrf_mirror_host.as_str()) {
            return None;
        }
        let cookie = self.jar.matching_cookie(url, XSRF_COOKIE_NAME)?;
        match HeaderValue::from_str(cookie.value()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("stored XSRF-TOKEN cookie is not a valid header value; not mirrored");
                None
            }
        }
    }

    /// Folds every Set-Cookie response header into the jar, with the request
    /// target's host as the cookie origin.
    fn capture_cookies(&mut self, headers: &HeaderMap, url: &Url) {
        let Some(origin_host) = url.host_str() else {
            return;
        };
        let raw: Vec<&str> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();
        if raw.is_empty() {
            return;
        }
        let parsed = self.jar.parse(raw, origin_host);
        debug!(origin = origin_host, count = parsed.len(), "captured cookies");
        self.jar.add(parsed);
    }
}

/// Returns the Location header when the response is an actionable redirect.
fn redirect_location(response: &SessionResponse) -> Option<String> {
    if !response.status().is_redirection() {
        return None;
    }
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}
