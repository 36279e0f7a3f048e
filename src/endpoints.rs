//! Platform endpoint configuration.
//!
//! The platform spans three fixed subsystems: the identity/login portal
//! (PSN), the authenticated portal (ENT) and the webmail API, plus the
//! webmail front-end host that authenticated mail calls must name as their
//! Referer. Defaults target production; alternate endpoints exist so the full
//! login flow can be driven against a local mock server in tests.

use url::Url;

/// Production identity/login portal.
pub const BASE_PSN_URL: &str = "https://psn.monlycee.net/";
/// Production authenticated portal.
pub const BASE_ENT_URL: &str = "https://ent.monlycee.net/";
/// Production webmail API base.
pub const BASE_WEBMAIL_API_URL: &str = "https://apis-mail.monlycee.net/webmail/xml/";
/// Production webmail front-end, used only as Referer/Origin on mail calls.
pub const BASE_WEBMAIL_UI_URL: &str = "https://web-mail.monlycee.net/";
/// Parent domain shared by the platform hosts; scope of the CSRF cookie.
pub const SESSION_COOKIE_DOMAIN: &str = "monlycee.net";

/// The set of hosts one client session talks to.
///
/// All base URLs must end with a trailing slash; request paths are appended
/// to them verbatim.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Identity/login portal base (entry point of the login flow).
    pub psn_base_url: Url,
    /// Authenticated portal base (OpenID callback, user info).
    pub ent_base_url: Url,
    /// Webmail API base (version probe, token handshake, mail listing).
    pub webmail_api_url: Url,
    /// Webmail front-end base, named as Referer/Origin on mail calls.
    pub webmail_ui_url: Url,
    /// Domain the synthetic CSRF cookie is scoped to, so it matches every
    /// platform host under the shared parent domain.
    pub session_cookie_domain: String,
}

impl Default for Endpoints {
    /// Production platform endpoints.
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            psn_base_url: Url::parse(BASE_PSN_URL).expect("static URL is valid"),
            ent_base_url: Url::parse(BASE_ENT_URL).expect("static URL is valid"),
            webmail_api_url: Url::parse(BASE_WEBMAIL_API_URL).expect("static URL is valid"),
            webmail_ui_url: Url::parse(BASE_WEBMAIL_UI_URL).expect("static URL is valid"),
            session_cookie_domain: SESSION_COOKIE_DOMAIN.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints_target_production() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.psn_base_url.as_str(), BASE_PSN_URL);
        assert_eq!(endpoints.webmail_api_url.as_str(), BASE_WEBMAIL_API_URL);
        assert_eq!(endpoints.session_cookie_domain, "monlycee.net");
    }

    #[test]
    fn test_default_base_urls_end_with_slash() {
        let endpoints = Endpoints::default();
        for url in [
            &endpoints.psn_base_url,
            &endpoints.ent_base_url,
            &endpoints.webmail_api_url,
            &endpoints.webmail_ui_url,
        ] {
            assert!(
                url.as_str().ends_with('/'),
                "base URL must end with a slash: {url}"
            );
        }
    }

    #[test]
    fn test_platform_hosts_share_session_cookie_domain() {
        let endpoints = Endpoints::default();
        for url in [
            &endpoints.psn_base_url,
            &endpoints.ent_base_url,
            &endpoints.webmail_api_url,
        ] {
            let host = url.host_str().unwrap();
            assert!(
                host.ends_with(&format!(".{}", endpoints.session_cookie_domain)),
                "{host} must sit under {}",
                endpoints.session_cookie_domain
            );
        }
    }
}
