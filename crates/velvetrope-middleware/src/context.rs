//! Request context.
//!
//! [`RequestContext`] carries the mutable per-request state through the
//! pipeline: the cookie jar, the resolved identity and locale, and the
//! extra headers to attach when the request is ultimately allowed. It is
//! owned exclusively by the pipeline for the duration of one request.

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::time::Instant;
use velvetrope_core::{CookieJar, Identity};

use crate::types::Request;

/// Mutable state threaded through the pipeline for one request.
///
/// # Example
///
/// ```
/// use velvetrope_middleware::context::RequestContext;
/// use velvetrope_core::Identity;
///
/// let mut ctx = RequestContext::new();
/// assert!(matches!(ctx.identity(), Identity::Anonymous));
/// ```
#[derive(Debug)]
pub struct RequestContext {
    /// Cookie store: request cookies plus mutations made so far.
    cookies: CookieJar,

    /// The caller identity, resolved by the session stage.
    identity: Identity,

    /// The locale resolved for page rendering.
    locale: Option<String>,

    /// Extra headers to attach to an allowed response.
    response_headers: HeaderMap,

    /// When the request started processing.
    started_at: Instant,
}

impl RequestContext {
    /// Creates an empty context (no cookies, anonymous).
    #[must_use]
    pub fn new() -> Self {
        Self {
            cookies: CookieJar::new(),
            identity: Identity::Anonymous,
            locale: None,
            response_headers: HeaderMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Creates a context for a request, parsing its `Cookie` header.
    #[must_use]
    pub fn from_request(request: &Request) -> Self {
        let cookie_header = request
            .headers()
            .get(http::header::COOKIE)
            .and_then(|v| v.to_str().ok());
        Self {
            cookies: CookieJar::from_header(cookie_header),
            identity: Identity::Anonymous,
            locale: None,
            response_headers: HeaderMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Returns the cookie jar.
    #[must_use]
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Returns the cookie jar mutably.
    pub fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    /// Returns the caller identity.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Sets the caller identity.
    ///
    /// This should only be called by the session stage.
    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }

    /// Returns the resolved locale, if the locale stage has run.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Sets the resolved locale.
    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = Some(locale.into());
    }

    /// Adds a header to attach when the request is allowed.
    pub fn insert_response_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    /// Returns the headers accumulated for an allowed response.
    #[must_use]
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Returns the accumulated headers mutably.
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since processing started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Decomposes the context into its response-facing parts
    /// (accumulated headers and pending cookie mutations).
    #[must_use]
    pub fn into_parts(self) -> (HeaderMap, Vec<velvetrope_core::SetCookie>) {
        (self.response_headers, self.cookies.into_pending())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
