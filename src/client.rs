//! Top-level client facade owning one platform session.

use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;
use url::Url;

use crate::api::{self, ApiError, MailQuery};
use crate::auth::{self, AuthError, Credentials};
use crate::cookie::{Cookie, CookieJar};
use crate::endpoints::Endpoints;
use crate::transport::{RequestOptions, SessionResponse, SessionTransport, TransportError};

/// One authenticated MonLycée session.
///
/// Owns the session transport and its cookie store exclusively. Create one
/// client per logical user session; intermediate login steps depend on
/// cookies set by earlier steps, so concurrent logins on a shared client
/// would corrupt the session state.
///
/// # Example
///
/// ```no_run
/// use monlycee_client::{Credentials, MailQuery, MonLyceeClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = MonLyceeClient::new();
/// client.login(&Credentials::new("jean.dupont", "secret")).await?;
/// let mails = client.mail_headers(&MailQuery::default()).await?;
/// println!("{mails}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MonLyceeClient {
    transport: SessionTransport,
    endpoints: Endpoints,
}

impl MonLyceeClient {
    /// Creates a client against the production platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client against alternate endpoints (a test double or a
    /// differently-hosted deployment of the platform).
    #[must_use]
    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        Self {
            transport: SessionTransport::new(),
            endpoints,
        }
    }

    /// Endpoint set this client talks to.
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Authenticates the session.
    ///
    /// On success the cookie store holds everything subsequent calls need;
    /// there is no payload. On failure nothing is resumable - call `login`
    /// again to restart from the entry page.
    ///
    /// # Errors
    ///
    /// See [`auth::login`].
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), AuthError> {
        auth::login(&mut self.transport, &self.endpoints, credentials).await
    }

    /// Lists mail headers for the given query.
    ///
    /// # Errors
    ///
    /// See [`api::mail::fetch_mail_headers`].
    pub async fn mail_headers(&mut self, query: &MailQuery) -> Result<Value, ApiError> {
        api::mail::fetch_mail_headers(&mut self.transport, &self.endpoints, query).await
    }

    /// Fetches the authenticated user's information.
    ///
    /// # Errors
    ///
    /// See [`api::account::fetch_user_info`].
    pub async fn user_info(&mut self) -> Result<Value, ApiError> {
        api::account::fetch_user_info(&mut self.transport, &self.endpoints).await
    }

    /// Fetches the user's profile.
    ///
    /// # Errors
    ///
    /// See [`api::account::fetch_profile`].
    pub async fn profile(&mut self) -> Result<Value, ApiError> {
        api::account::fetch_profile(&mut self.transport, &self.endpoints).await
    }

    /// Issues a single request on the session, without redirect following.
    ///
    /// # Errors
    ///
    /// See [`SessionTransport::request`].
    pub async fn request(
        &mut self,
        method: Method,
        url: &str,
        body: Option<String>,
        headers: Option<HeaderMap>,
    ) -> Result<SessionResponse, TransportError> {
        self.transport.request(method, url, body, headers).await
    }

    /// Convenience GET on the session.
    ///
    /// # Errors
    ///
    /// See [`SessionTransport::request`].
    pub async fn get(
        &mut self,
        url: &str,
        headers: Option<HeaderMap>,
    ) -> Result<SessionResponse, TransportError> {
        self.transport.get(url, headers).await
    }

    /// Convenience POST on the session.
    ///
    /// # Errors
    ///
    /// See [`SessionTransport::request`].
    pub async fn post(
        &mut self,
        url: &str,
        body: impl Into<String>,
        headers: Option<HeaderMap>,
    ) -> Result<SessionResponse, TransportError> {
        self.transport.post(url, body, headers).await
    }

    /// Issues requests starting at `url`, following redirects with the
    /// session's cookie state.
    ///
    /// # Errors
    ///
    /// See [`SessionTransport::follow_redirects`].
    pub async fn follow_redirects(
        &mut self,
        url: &str,
        options: RequestOptions,
    ) -> Result<SessionResponse, TransportError> {
        self.transport.follow_redirects(url, options).await
    }

    /// Cookie header the session would attach to a request for `url`.
    #[must_use]
    pub fn cookie_header_for(&self, url: &Url) -> Option<String> {
        self.transport.cookie_jar().header_for(url)
    }

    /// Some stored cookie with the given name.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.transport.cookie_jar().lookup(name)
    }

    /// Adds or replaces a cookie in the session store.
    pub fn add_cookie(&mut self, cookie: Cookie) {
        self.transport.cookie_jar_mut().add_cookie(cookie);
    }

    /// Hands out the store's next creation index for synthetic cookies.
    pub fn next_creation_index(&mut self) -> u64 {
        self.transport.cookie_jar_mut().next_creation_index()
    }

    /// Shared access to the session's cookie store.
    #[must_use]
    pub fn cookie_jar(&self) -> &CookieJar {
        self.transport.cookie_jar()
    }
}
