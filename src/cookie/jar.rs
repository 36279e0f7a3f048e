//! In-memory cookie store with the platform's RFC-6265-style matching rules.
//!
//! Parses Set-Cookie headers, upserts by (name, domain, path) key and computes
//! the Cookie header for outbound requests. Expiry is recorded but never
//! enforced; the store lives exactly as long as its session and is owned
//! exclusively by one transport.

use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;

use tracing::warn;
use url::Url;

/// A single stored cookie.
///
/// The value field is redacted in Debug output to keep session tokens out of
/// logs.
#[derive(Clone)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// URL path scope; `/` when the server sent none.
    pub path: String,
    /// Domain attribute, lower-cased with the leading dot stripped.
    /// `None` means host-only: the cookie matches its origin host exactly.
    pub domain: Option<String>,
    /// Host that set the cookie.
    pub origin_host: String,
    /// Monotonic insertion counter, used only as an ordering tie-break.
    pub creation_index: u64,
    /// Expires attribute. Recorded for inspection, never enforced.
    pub expires: Option<SystemTime>,
    /// Only sent over https when set.
    pub secure: bool,
    /// HttpOnly attribute (informational).
    pub http_only: bool,
    /// SameSite attribute, lower-cased (informational, unused for matching).
    pub same_site: Option<String>,
    /// Cookie value (sensitive - never log).
    value: String,
}

impl Cookie {
    /// Creates a host-only cookie with default attributes: path `/`, no
    /// domain, no expiry, not secure, not http-only.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        origin_host: impl Into<String>,
        creation_index: u64,
    ) -> Self {
        Self {
            name: name.into(),
            path: "/".to_string(),
            domain: None,
            origin_host: origin_host.into(),
            creation_index,
            expires: None,
            secure: false,
            http_only: false,
            same_site: None,
            value: value.into(),
        }
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive - avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// RFC 6265 section 5.1.3 as the platform applies it: with a Domain
    /// attribute, exact equality or subdomain suffix match; host-only cookies
    /// match their origin host exactly.
    #[must_use]
    pub fn domain_matches(&self, hostname: &str) -> bool {
        match &self.domain {
            Some(domain) => hostname == domain || hostname.ends_with(&format!(".{domain}")),
            None => hostname == self.origin_host,
        }
    }

    /// RFC 6265 section 5.1.4 as the platform applies it: plain string prefix
    /// match on the request path.
    #[must_use]
    pub fn path_matches(&self, request_path: &str) -> bool {
        request_path.starts_with(&self.path)
    }

    /// Secure cookies are only eligible on https requests.
    #[must_use]
    pub fn scheme_matches(&self, scheme: &str) -> bool {
        !self.secure || scheme == "https"
    }

    fn key(&self) -> CookieKey {
        CookieKey {
            name: self.name.clone(),
            domain: self
                .domain
                .clone()
                .unwrap_or_else(|| self.origin_host.clone()),
            path: self.path.clone(),
        }
    }
}

// Custom Debug impl that redacts the cookie value.
impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("domain", &self.domain)
            .field("origin_host", &self.origin_host)
            .field("creation_index", &self.creation_index)
            .field("expires", &self.expires)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("same_site", &self.same_site)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Storage key: a cookie is unique per (name, effective domain, path).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CookieKey {
    name: String,
    domain: String,
    path: String,
}

/// In-memory cookie store for a single session.
///
/// No persistence, no expiry-based eviction, no public-suffix checks: exactly
/// the scoping behavior the platform's login and mail flows depend on.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: HashMap<CookieKey, Cookie>,
    creation_counter: u64,
}

impl CookieJar {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw Set-Cookie header values into cookies.
    ///
    /// The first `;`-segment is `name=value`, split at the first `=` only so
    /// values may themselves contain `=`. Attribute names are parsed
    /// case-insensitively; unrecognized attributes are ignored. A header
    /// whose first segment has no `=` (or an empty name) is malformed and
    /// skipped with a warning rather than stored as a mangled cookie.
    pub fn parse<'a>(
        &mut self,
        set_cookie_headers: impl IntoIterator<Item = &'a str>,
        origin_host: &str,
    ) -> Vec<Cookie> {
        set_cookie_headers
            .into_iter()
            .filter_map(|header| self.parse_one(header, origin_host))
            .collect()
    }

    fn parse_one(&mut self, header: &str, origin_host: &str) -> Option<Cookie> {
        let mut segments = header.split(';').map(str::trim);
        let name_value = segments.next()?;

        let Some((name, value)) = name_value.split_once('=') else {
            warn!(origin = origin_host, "skipping Set-Cookie header without '='");
            return None;
        };
        if name.is_empty() {
            warn!(origin = origin_host, "skipping Set-Cookie header with empty name");
            return None;
        }

        let index = self.next_creation_index();
        let mut cookie = Cookie::new(name, value, origin_host, index);

        for attribute in segments {
            let (attr_name, attr_value) = match attribute.split_once('=') {
                Some((attr_name, attr_value)) => (attr_name.trim(), Some(attr_value.trim())),
                None => (attribute, None),
            };
            match attr_name.to_ascii_lowercase().as_str() {
                "path" => {
                    cookie.path = match attr_value {
                        Some(path) if !path.is_empty() => path.to_string(),
                        _ => "/".to_string(),
                    };
                }
                "domain" => {
                    cookie.domain = attr_value
                        .map(|domain| {
                            let domain = domain.to_ascii_lowercase();
                            domain.strip_prefix('.').unwrap_or(&domain).to_string()
                        })
                        .filter(|domain| !domain.is_empty());
                }
                "expires" => {
                    cookie.expires = attr_value.and_then(|v| httpdate::parse_http_date(v).ok());
                }
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                "samesite" => {
                    cookie.same_site = attr_value
                        .map(str::to_ascii_lowercase)
                        .filter(|v| !v.is_empty());
                }
                _ => {}
            }
        }

        Some(cookie)
    }

    /// Upserts cookies by key.
    pub fn add(&mut self, cookies: Vec<Cookie>) {
        for cookie in cookies {
            self.add_cookie(cookie);
        }
    }

    /// Upserts one cookie by its (name, effective domain, path) key.
    ///
    /// An empty value is a deletion signal: the stored cookie with the same
    /// key is removed instead of being replaced by an empty entry.
    pub fn add_cookie(&mut self, cookie: Cookie) {
        let key = cookie.key();
        if cookie.value.is_empty() {
            self.cookies.remove(&key);
        } else {
            self.cookies.insert(key, cookie);
        }
    }

    /// Computes the Cookie header value for a request URL.
    ///
    /// Matching cookies (domain, path and scheme rules on [`Cookie`]) are
    /// ordered by descending path length, then ascending creation index, and
    /// serialized as `name=value` pairs joined by `"; "`. Returns `None` when
    /// nothing matches; the caller must omit the header entirely rather than
    /// send an empty one.
    #[must_use]
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let hostname = url.host_str().unwrap_or("");
        let path = url.path();
        let scheme = url.scheme();

        let mut matching: Vec<&Cookie> = self
            .cookies
            .values()
            .filter(|cookie| {
                cookie.domain_matches(hostname)
                    && cookie.path_matches(path)
                    && cookie.scheme_matches(scheme)
            })
            .collect();
        if matching.is_empty() {
            return None;
        }
        matching.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then(a.creation_index.cmp(&b.creation_index))
        });

        Some(
            matching
                .iter()
                .map(|cookie| format!("{}={}", cookie.name, cookie.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Returns some stored cookie with the given name.
    ///
    /// Which one wins among duplicates across domains or paths is
    /// unspecified; callers must not rely on it.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Cookie> {
        self.cookies.values().find(|cookie| cookie.name == name)
    }

    /// Returns a cookie with the given name that is eligible for the URL
    /// under the same rules as [`header_for`](Self::header_for).
    #[must_use]
    pub fn matching_cookie(&self, url: &Url, name: &str) -> Option<&Cookie> {
        let hostname = url.host_str().unwrap_or("");
        self.cookies.values().find(|cookie| {
            cookie.name == name
                && cookie.domain_matches(hostname)
                && cookie.path_matches(url.path())
                && cookie.scheme_matches(url.scheme())
        })
    }

    /// Hands out the next creation index so synthetic cookies keep the
    /// store's ordering guarantees.
    pub fn next_creation_index(&mut self) -> u64 {
        let index = self.creation_counter;
        self.creation_counter += 1;
        index
    }

    /// Number of stored cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// True when the store holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_parse_bare_cookie_gets_defaults() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["SESSION=abc123"], "ent.example.net");

        assert_eq!(cookies.len(), 1);
        let cookie = &cookies[0];
        assert_eq!(cookie.name, "SESSION");
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.domain, None);
        assert_eq!(cookie.origin_host, "ent.example.net");
        assert_eq!(cookie.expires, None);
        assert!(!cookie.secure);
        assert!(!cookie.http_only);
        assert_eq!(cookie.same_site, None);
    }

    #[test]
    fn test_parse_value_keeps_embedded_equals() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["tok=a=b=c; Path=/mail"], "example.net");
        assert_eq!(cookies[0].value(), "a=b=c");
        assert_eq!(cookies[0].path, "/mail");
    }

    #[test]
    fn test_parse_attributes_case_insensitive() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(
            ["id=1; PATH=/a; DOMAIN=.Example.NET; SECURE; HttpOnly; SameSite=Lax"],
            "sub.example.net",
        );
        let cookie = &cookies[0];
        assert_eq!(cookie.path, "/a");
        assert_eq!(cookie.domain.as_deref(), Some("example.net"));
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.same_site.as_deref(), Some("lax"));
    }

    #[test]
    fn test_parse_domain_strips_single_leading_dot() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["a=1; Domain=.example.net"], "example.net");
        assert_eq!(cookies[0].domain.as_deref(), Some("example.net"));
    }

    #[test]
    fn test_parse_empty_path_attribute_defaults_to_root() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["a=1; Path="], "example.net");
        assert_eq!(cookies[0].path, "/");
    }

    #[test]
    fn test_parse_expires_http_date() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(
            ["a=1; Expires=Wed, 21 Oct 2065 07:28:00 GMT"],
            "example.net",
        );
        assert!(cookies[0].expires.is_some());
    }

    #[test]
    fn test_parse_unparsable_expires_is_none() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["a=1; Expires=tomorrow-ish"], "example.net");
        assert_eq!(cookies[0].expires, None);
    }

    #[test]
    fn test_parse_unknown_attribute_ignored() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["a=1; Partitioned; Priority=High"], "example.net");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value(), "1");
    }

    #[test]
    fn test_parse_rejects_header_without_equals() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["garbage-no-separator; Path=/"], "example.net");
        assert!(cookies.is_empty(), "malformed header must not yield a cookie");
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["=value; Path=/"], "example.net");
        assert!(cookies.is_empty());
    }

    #[test]
    fn test_parse_no_headers_yields_nothing() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse([], "example.net");
        assert!(cookies.is_empty());
    }

    #[test]
    fn test_add_same_key_replaces() {
        let mut jar = CookieJar::new();
        let first = jar.parse(["SESSION=old"], "example.net");
        jar.add(first);
        let second = jar.parse(["SESSION=new"], "example.net");
        jar.add(second);

        assert_eq!(jar.len(), 1);
        assert_eq!(jar.lookup("SESSION").unwrap().value(), "new");
    }

    #[test]
    fn test_add_empty_value_deletes_instead_of_storing() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["SESSION=abc"], "example.net");
        jar.add(cookies);
        assert_eq!(jar.len(), 1);

        let deletion = jar.parse(["SESSION="], "example.net");
        jar.add(deletion);
        assert!(jar.is_empty(), "empty value must remove the stored cookie");
        assert!(jar.lookup("SESSION").is_none());
    }

    #[test]
    fn test_same_name_different_path_are_distinct_keys() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["id=root; Path=/", "id=mail; Path=/mail"], "example.net");
        jar.add(cookies);
        assert_eq!(jar.len(), 2);
    }

    #[test]
    fn test_header_for_exact_host_match() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["SESSION=abc"], "ent.example.net");
        jar.add(cookies);

        assert_eq!(
            jar.header_for(&url("https://ent.example.net/x")).as_deref(),
            Some("SESSION=abc")
        );
        assert_eq!(jar.header_for(&url("https://other.example.net/x")), None);
    }

    #[test]
    fn test_header_for_domain_suffix_match() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["tok=1; Domain=example.com"], "apis.example.com");
        jar.add(cookies);

        assert!(jar.header_for(&url("https://example.com/")).is_some());
        assert!(jar.header_for(&url("https://sub.example.com/")).is_some());
        assert_eq!(
            jar.header_for(&url("https://otherexample.com/")),
            None,
            "suffix match must not cross registrable-domain boundaries"
        );
    }

    #[test]
    fn test_header_for_path_prefix() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["m=1; Path=/mail"], "example.net");
        jar.add(cookies);

        assert!(jar.header_for(&url("https://example.net/mail/inbox")).is_some());
        assert_eq!(jar.header_for(&url("https://example.net/agenda")), None);
    }

    #[test]
    fn test_header_for_secure_requires_https() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["SESSION=abc; Path=/; Secure"], "ent.example.net");
        jar.add(cookies);

        assert_eq!(
            jar.header_for(&url("https://ent.example.net/x")).as_deref(),
            Some("SESSION=abc")
        );
        assert_eq!(
            jar.header_for(&url("http://ent.example.net/x")),
            None,
            "secure cookie must never go out over http"
        );
    }

    #[test]
    fn test_header_for_orders_longest_path_first() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["outer=1; Path=/a", "inner=2; Path=/a/b"], "example.net");
        jar.add(cookies);

        assert_eq!(
            jar.header_for(&url("https://example.net/a/b/c")).as_deref(),
            Some("inner=2; outer=1")
        );
    }

    #[test]
    fn test_header_for_ties_break_on_creation_order() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["first=1; Path=/", "second=2; Path=/"], "example.net");
        jar.add(cookies);

        assert_eq!(
            jar.header_for(&url("https://example.net/")).as_deref(),
            Some("first=1; second=2")
        );
    }

    #[test]
    fn test_header_for_empty_jar_is_none() {
        let jar = CookieJar::new();
        assert_eq!(jar.header_for(&url("https://example.net/")), None);
    }

    #[test]
    fn test_matching_cookie_applies_url_rules() {
        let mut jar = CookieJar::new();
        let cookies = jar.parse(["XSRF-TOKEN=tok; Path=/; Secure"], "ent.example.net");
        jar.add(cookies);

        assert!(
            jar.matching_cookie(&url("https://ent.example.net/"), "XSRF-TOKEN")
                .is_some()
        );
        assert!(
            jar.matching_cookie(&url("http://ent.example.net/"), "XSRF-TOKEN")
                .is_none(),
            "secure cookie must not match an http URL"
        );
        assert!(
            jar.matching_cookie(&url("https://elsewhere.net/"), "XSRF-TOKEN")
                .is_none()
        );
    }

    #[test]
    fn test_next_creation_index_is_monotonic() {
        let mut jar = CookieJar::new();
        let first = jar.next_creation_index();
        let second = jar.next_creation_index();
        assert!(second > first);

        let cookies = jar.parse(["a=1"], "example.net");
        assert!(cookies[0].creation_index > second);
    }

    #[test]
    fn test_synthetic_cookie_with_domain_matches_subdomains() {
        let mut jar = CookieJar::new();
        let index = jar.next_creation_index();
        let mut cookie = Cookie::new("CSRF_TOKEN", "tok-1", "apis-mail.example.net", index);
        cookie.domain = Some("example.net".to_string());
        jar.add_cookie(cookie);

        assert_eq!(
            jar.header_for(&url("https://apis-mail.example.net/webmail/xml/x"))
                .as_deref(),
            Some("CSRF_TOKEN=tok-1")
        );
        assert!(jar.header_for(&url("https://ent.example.net/")).is_some());
    }

    #[test]
    fn test_cookie_debug_redacts_value() {
        let cookie = Cookie::new("SESSION", "super_secret_token", "example.net", 0);
        let debug_str = format!("{cookie:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(
            !debug_str.contains("super_secret_token"),
            "Debug output must NOT contain the actual value"
        );
    }
}
