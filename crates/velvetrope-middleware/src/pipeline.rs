//! Fixed-order edge pipeline.
//!
//! Every request flows through the same ordered stage list. Each stage
//! returns a [`StageOutcome`]; the pipeline folds over the list and
//! stops at the first terminal outcome.
//!
//! ## Pipeline Stages
//!
//! The full edge configuration runs 8 stages in a fixed order:
//!
//! 1. **Static assets** - Framework internals and asset files skip everything
//! 2. **CORS preflight** - OPTIONS requests get an immediate 204
//! 3. **API security** - Rate limiting and CSRF origin checks for API routes
//! 4. **Locale** - Resolve the request locale from path, cookie, or header
//! 5. **Session** - Refresh the auth session and establish identity
//! 6. **Access gate** - Sitewide password wall backed by a signed token
//! 7. **Route guard** - Auth-required routes and the onboarding redirect
//! 8. *(finisher)* - Security headers are appended when the fold completes
//!
//! The finisher is not a stage: a request that falls off the end of the
//! list is allowed, and the pipeline stamps the standard security
//! headers onto the accumulated response header set at that point. A
//! stage that returns [`StageOutcome::Allow`] bypasses the finisher, so
//! static assets pass through byte-unchanged.

use crate::context::RequestContext;
use crate::stage::{Stage, StageOutcome};
use crate::stages::security::append_security_headers;
use crate::types::{Request, Response};
use http::header::SET_COOKIE;
use http::{HeaderMap, HeaderValue};
use std::sync::Arc;
use velvetrope_core::{Identity, SetCookie};

/// A type-erased stage that can be stored in the stage list.
pub type BoxedStage = Arc<dyn Stage>;

/// The decision the pipeline hands back to the caller.
#[derive(Debug)]
pub enum Verdict {
    /// Forward the request to the application, carrying the
    /// accumulated response mutations.
    Allow(PassThrough),
    /// Answer the request with this response instead of forwarding it.
    Intercept(Response),
}

impl Verdict {
    /// Returns true for [`Verdict::Allow`].
    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Everything a forwarded request carries out of the pipeline.
///
/// The caller merges `headers` and `cookies` into the eventual
/// application response with [`PassThrough::apply_to`]; `identity` and
/// `locale` are available for request handling.
#[derive(Debug, Default)]
pub struct PassThrough {
    /// Headers to append to the application response.
    pub headers: HeaderMap,
    /// Cookie writes queued during the pipeline run.
    pub cookies: Vec<SetCookie>,
    /// The caller identity the session stage established.
    pub identity: Identity,
    /// The resolved locale, if the locale stage ran.
    pub locale: Option<String>,
}

impl PassThrough {
    /// Appends the accumulated headers and cookie writes to `response`.
    pub fn apply_to(&self, response: &mut Response) {
        for (name, value) in &self.headers {
            response.headers_mut().append(name, value.clone());
        }
        for cookie in &self.cookies {
            if let Ok(value) = HeaderValue::from_str(&cookie.to_header_value()) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
    }
}

/// The fixed-order edge pipeline.
///
/// The stage list is frozen at construction. Stages cannot be
/// reordered, suppressed, or inserted afterwards.
///
/// # Example
///
/// ```ignore
/// use velvetrope_middleware::pipeline::Pipeline;
///
/// let pipeline = Pipeline::builder()
///     .add_stage(StaticAssetStage::new())
///     .add_stage(CorsPreflightStage::new())
///     .build();
///
/// let verdict = pipeline.run(&request).await;
/// ```
pub struct Pipeline {
    stages: Vec<BoxedStage>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs a request through the stage list and returns the verdict.
    ///
    /// Stages execute strictly in order. The first terminal outcome
    /// stops the fold; a fall-through is an allow with the standard
    /// security headers appended.
    pub async fn run(&self, request: &Request) -> Verdict {
        let mut ctx = RequestContext::from_request(request);
        let path = request.uri().path().to_string();

        for stage in &self.stages {
            match stage.apply(&mut ctx, request).await {
                StageOutcome::Continue => {
                    tracing::trace!(stage = stage.name(), %path, "stage passed");
                }
                StageOutcome::Allow => {
                    tracing::debug!(
                        stage = stage.name(),
                        %path,
                        elapsed_us = ctx.elapsed().as_micros() as u64,
                        "request allowed"
                    );
                    return Self::allow(ctx);
                }
                StageOutcome::Intercept(response) => {
                    tracing::debug!(
                        stage = stage.name(),
                        %path,
                        status = %response.status(),
                        elapsed_us = ctx.elapsed().as_micros() as u64,
                        "request intercepted"
                    );
                    return Self::intercept(ctx, response);
                }
            }
        }

        // Finisher: a completed fold allows the request with the
        // standard security headers on top of whatever earlier stages
        // accumulated.
        append_security_headers(ctx.response_headers_mut());
        tracing::debug!(
            %path,
            elapsed_us = ctx.elapsed().as_micros() as u64,
            "request allowed"
        );
        Self::allow(ctx)
    }

    /// Returns the names of all stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    fn allow(ctx: RequestContext) -> Verdict {
        let identity = ctx.identity().clone();
        let locale = ctx.locale().map(ToOwned::to_owned);
        let (headers, cookies) = ctx.into_parts();
        Verdict::Allow(PassThrough {
            headers,
            cookies,
            identity,
            locale,
        })
    }

    /// Interception still carries the cookie writes queued so far,
    /// most importantly rotated session cookies on a redirect.
    fn intercept(ctx: RequestContext, mut response: Response) -> Verdict {
        let (_, cookies) = ctx.into_parts();
        for cookie in &cookies {
            if let Ok(value) = HeaderValue::from_str(&cookie.to_header_value()) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        Verdict::Intercept(response)
    }
}

/// Builder for constructing a [`Pipeline`].
pub struct PipelineBuilder {
    stages: Vec<BoxedStage>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage to the end of the list.
    #[must_use]
    pub fn add_stage<S: Stage>(mut self, stage: S) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Appends an already-boxed stage to the end of the list.
    #[must_use]
    pub fn add_boxed_stage(mut self, stage: BoxedStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Freezes the stage list into a [`Pipeline`].
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
