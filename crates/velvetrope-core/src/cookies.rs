//! Request-scoped cookie store.
//!
//! Cookies are the one piece of state the pipeline both reads and
//! mutates mid-request: session refresh can rotate the auth provider's
//! tokens while the request is still being decided. [`CookieJar`] is the
//! single write-through interface for that: a `set` is immediately
//! visible to later `get`s in the same request, *and* recorded as a
//! pending `Set-Cookie` for the outgoing response. Stages never touch
//! two separate request/response cookie objects.

use std::collections::HashMap;

/// `SameSite` attribute values for a [`SetCookie`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    /// Sent on same-site requests and top-level cross-site navigations.
    #[default]
    Lax,
    /// Sent on same-site requests only.
    Strict,
    /// Sent on all requests (requires `Secure`).
    None,
}

impl SameSite {
    /// Returns the attribute value as it appears on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
            Self::None => "None",
        }
    }
}

/// A cookie mutation to be applied to the outgoing response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Cookie path. Defaults to `/`.
    pub path: String,
    /// Lifetime in seconds; `None` for a session cookie.
    pub max_age: Option<u64>,
    /// Whether the cookie is hidden from client-side scripts.
    pub http_only: bool,
    /// Whether the cookie is only sent over HTTPS.
    pub secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
}

impl SetCookie {
    /// Creates a cookie mutation with default attributes
    /// (path `/`, session lifetime, not `HttpOnly`, not `Secure`, `Lax`).
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            max_age: None,
            http_only: false,
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Sets the cookie path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the cookie lifetime in seconds.
    #[must_use]
    pub const fn max_age(mut self, seconds: u64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Marks the cookie `HttpOnly`.
    #[must_use]
    pub const fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    /// Marks the cookie `Secure`.
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the `SameSite` policy.
    #[must_use]
    pub const fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Renders the `Set-Cookie` header value.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(max_age) = self.max_age {
            out.push_str(&format!("; Max-Age={max_age}"));
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }
        out.push_str("; SameSite=");
        out.push_str(self.same_site.as_str());
        out
    }
}

/// The cookie store for one request.
///
/// Parsed once from the incoming `Cookie` header. Mutations recorded via
/// [`CookieJar::set`] are visible to subsequent [`CookieJar::get`] calls
/// in the same request and collected for the outgoing response by the
/// finisher.
///
/// # Example
///
/// ```
/// use velvetrope_core::{CookieJar, SetCookie};
///
/// let mut jar = CookieJar::from_header(Some("NEXT_LOCALE=fr; theme=dark"));
/// assert_eq!(jar.get("NEXT_LOCALE"), Some("fr"));
///
/// jar.set(SetCookie::new("sb-access-token", "rotated"));
/// // Later stages see the rotated value...
/// assert_eq!(jar.get("sb-access-token"), Some("rotated"));
/// // ...and the response finisher picks up the mutation.
/// assert_eq!(jar.pending().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    /// Current cookie values as seen by the rest of this request.
    values: HashMap<String, String>,
    /// Mutations to emit as `Set-Cookie` headers, in insertion order.
    pending: Vec<SetCookie>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a jar from an incoming `Cookie` header value.
    ///
    /// Malformed pairs (no `=`) are skipped; a missing header yields an
    /// empty jar.
    #[must_use]
    pub fn from_header(header: Option<&str>) -> Self {
        let mut values = HashMap::new();
        if let Some(header) = header {
            for pair in header.split(';') {
                let pair = pair.trim();
                if let Some((name, value)) = pair.split_once('=') {
                    if !name.is_empty() {
                        values.insert(name.to_string(), value.to_string());
                    }
                }
            }
        }
        Self {
            values,
            pending: Vec::new(),
        }
    }

    /// Returns the current value of a cookie, including values written
    /// earlier in this request.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Returns true if the jar holds a cookie with the given name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Records a cookie mutation.
    ///
    /// The new value is visible to later `get`s in this request, and the
    /// full mutation (with attributes) is queued for the response. A
    /// second `set` for the same name supersedes the first.
    pub fn set(&mut self, cookie: SetCookie) {
        self.values
            .insert(cookie.name.clone(), cookie.value.clone());
        self.pending.retain(|c| c.name != cookie.name);
        self.pending.push(cookie);
    }

    /// Returns the mutations queued for the outgoing response.
    #[must_use]
    pub fn pending(&self) -> &[SetCookie] {
        &self.pending
    }

    /// Consumes the jar, returning the queued mutations.
    #[must_use]
    pub fn into_pending(self) -> Vec<SetCookie> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header_parses_pairs() {
        let jar = CookieJar::from_header(Some("a=1; b=2;c=3"));
        assert_eq!(jar.get("a"), Some("1"));
        assert_eq!(jar.get("b"), Some("2"));
        assert_eq!(jar.get("c"), Some("3"));
    }

    #[test]
    fn test_from_header_missing() {
        let jar = CookieJar::from_header(None);
        assert!(jar.get("anything").is_none());
        assert!(jar.pending().is_empty());
    }

    #[test]
    fn test_from_header_skips_malformed_pairs() {
        let jar = CookieJar::from_header(Some("valid=yes; malformed; =nameless"));
        assert_eq!(jar.get("valid"), Some("yes"));
        assert!(!jar.contains("malformed"));
    }

    #[test]
    fn test_value_with_equals_sign_kept_whole() {
        // JWTs contain base64url padding-free segments, but other values
        // may embed '='; only the first one splits name from value.
        let jar = CookieJar::from_header(Some("token=abc=def"));
        assert_eq!(jar.get("token"), Some("abc=def"));
    }

    #[test]
    fn test_set_is_visible_to_later_reads() {
        let mut jar = CookieJar::from_header(Some("session=old"));
        jar.set(SetCookie::new("session", "rotated"));
        assert_eq!(jar.get("session"), Some("rotated"));
    }

    #[test]
    fn test_set_queues_pending_mutation() {
        let mut jar = CookieJar::new();
        jar.set(SetCookie::new("a", "1"));
        jar.set(SetCookie::new("b", "2"));
        let names: Vec<_> = jar.pending().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_second_set_supersedes_first() {
        let mut jar = CookieJar::new();
        jar.set(SetCookie::new("session", "first"));
        jar.set(SetCookie::new("session", "second"));
        assert_eq!(jar.pending().len(), 1);
        assert_eq!(jar.pending()[0].value, "second");
        assert_eq!(jar.get("session"), Some("second"));
    }

    #[test]
    fn test_set_cookie_header_value_full() {
        let cookie = SetCookie::new("access-token", "tok")
            .max_age(7200)
            .http_only()
            .secure(true)
            .same_site(SameSite::Lax);
        assert_eq!(
            cookie.to_header_value(),
            "access-token=tok; Path=/; Max-Age=7200; HttpOnly; Secure; SameSite=Lax"
        );
    }

    #[test]
    fn test_set_cookie_header_value_minimal() {
        let cookie = SetCookie::new("NEXT_LOCALE", "fr");
        assert_eq!(
            cookie.to_header_value(),
            "NEXT_LOCALE=fr; Path=/; SameSite=Lax"
        );
    }

    #[test]
    fn test_same_site_strings() {
        assert_eq!(SameSite::Lax.as_str(), "Lax");
        assert_eq!(SameSite::Strict.as_str(), "Strict");
        assert_eq!(SameSite::None.as_str(), "None");
    }
}
