//! Per-route API security.
//!
//! API routes get rate limiting and CSRF origin checks according to
//! the route policy table in [`SecurityConfig`]. A request that clears
//! its policy leaves the pipeline immediately: API routes never need
//! locales, sessions, or the access gate, so the stage answers with
//! [`StageOutcome::Allow`] and the standard security headers already
//! attached.

use crate::context::RequestContext;
use crate::rate_limit::{RateLimitDecision, RateLimitStore};
use crate::stage::{BoxFuture, Stage, StageOutcome};
use crate::types::{Request, Response, ResponseExt};
use http::header::{HeaderMap, HeaderValue};
use http::{Method, StatusCode};
use std::sync::Arc;
use std::time::Instant;
use velvetrope_config::SecurityConfig;

/// The fixed security headers stamped onto every non-static response.
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
];

/// Appends the standard security headers to `headers`.
pub fn append_security_headers(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        headers.insert(*name, HeaderValue::from_static(value));
    }
}

/// Extracts the client address for rate-limit keying.
///
/// Order of trust: first entry of `x-forwarded-for`, then `x-real-ip`,
/// then the literal `"unknown"`. Requests with no address information
/// share one bucket rather than bypassing the limit.
fn client_ip(request: &Request) -> &str {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first;
            }
        }
    }
    request
        .headers()
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
}

/// Pulls the host (with port) out of an Origin header value.
fn origin_host(origin: &str) -> Option<&str> {
    let rest = origin.split_once("://").map_or(origin, |(_, rest)| rest);
    let host = rest.split('/').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Stage that enforces route security policies on `/api/` paths.
pub struct ApiSecurityStage {
    config: SecurityConfig,
    store: Arc<dyn RateLimitStore>,
}

impl ApiSecurityStage {
    /// Creates the stage with a policy table and a counter store.
    #[must_use]
    pub fn new(config: SecurityConfig, store: Arc<dyn RateLimitStore>) -> Self {
        Self { config, store }
    }

    /// CSRF origin check for state-changing requests.
    ///
    /// GET requests are exempt. A request whose Origin host differs
    /// from its Host header is rejected. A missing Origin or Host
    /// header passes: non-browser clients do not send Origin, and the
    /// check exists to stop cross-site browser requests, not to
    /// authenticate callers.
    fn csrf_violation(request: &Request) -> bool {
        if request.method() == Method::GET {
            return false;
        }
        let origin = request
            .headers()
            .get("origin")
            .and_then(|value| value.to_str().ok())
            .and_then(origin_host);
        let host = request
            .headers()
            .get("host")
            .and_then(|value| value.to_str().ok());
        match (origin, host) {
            (Some(origin), Some(host)) => origin != host,
            _ => false,
        }
    }
}

impl Stage for ApiSecurityStage {
    fn name(&self) -> &'static str {
        "api_security"
    }

    fn apply<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: &'a Request,
    ) -> BoxFuture<'a, StageOutcome> {
        Box::pin(async move {
            let path = request.uri().path();
            if path != "/api" && !path.starts_with("/api/") {
                return StageOutcome::Continue;
            }

            if let Some(policy) = self.config.match_policy(path) {
                if let Some(rule) = &policy.rate_limit {
                    let key = format!("{}:{}", policy.prefix, client_ip(request));
                    let decision = self.store.check(&key, rule, Instant::now());
                    if decision == RateLimitDecision::Limited {
                        tracing::warn!(%path, key = %key, "rate limit exceeded");
                        return StageOutcome::Intercept(Response::json_error(
                            StatusCode::TOO_MANY_REQUESTS,
                            "rate_limited",
                            "Too many requests, please try again later",
                        ));
                    }
                }

                if policy.csrf_enabled && Self::csrf_violation(request) {
                    tracing::warn!(%path, "csrf origin mismatch");
                    return StageOutcome::Intercept(Response::json_error(
                        StatusCode::FORBIDDEN,
                        "invalid_origin",
                        "Invalid origin",
                    ));
                }
            }

            append_security_headers(ctx.response_headers_mut());
            StageOutcome::Allow
        })
    }
}
