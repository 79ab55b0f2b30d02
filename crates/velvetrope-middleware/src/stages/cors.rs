//! CORS preflight responder.
//!
//! Browsers send an `OPTIONS` preflight before cross-origin requests
//! with non-simple methods or headers. The application never sees
//! those: this stage answers every `OPTIONS` request immediately with
//! a 204 carrying the site's fixed CORS policy.

use crate::context::RequestContext;
use crate::stage::{BoxFuture, Stage, StageOutcome};
use crate::types::Request;
use bytes::Bytes;
use http::{Method, Response as HttpResponse, StatusCode};
use http_body_util::Full;

/// Methods the site accepts cross-origin.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Request headers the site accepts cross-origin.
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization, X-CSRF-Token";

/// How long browsers may cache the preflight result, in seconds.
pub const PREFLIGHT_MAX_AGE_SECS: u64 = 86_400;

/// Stage that intercepts `OPTIONS` requests with a preflight response.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorsPreflightStage;

impl CorsPreflightStage {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Stage for CorsPreflightStage {
    fn name(&self) -> &'static str {
        "cors_preflight"
    }

    fn apply<'a>(
        &'a self,
        _ctx: &'a mut RequestContext,
        request: &'a Request,
    ) -> BoxFuture<'a, StageOutcome> {
        Box::pin(async move {
            if request.method() != Method::OPTIONS {
                return StageOutcome::Continue;
            }

            let response = HttpResponse::builder()
                .status(StatusCode::NO_CONTENT)
                .header("access-control-allow-methods", ALLOWED_METHODS)
                .header("access-control-allow-headers", ALLOWED_HEADERS)
                .header("access-control-max-age", PREFLIGHT_MAX_AGE_SECS.to_string())
                .body(Full::new(Bytes::new()))
                .expect("failed to build preflight response");

            StageOutcome::Intercept(response)
        })
    }
}
