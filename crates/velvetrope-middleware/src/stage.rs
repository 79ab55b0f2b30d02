//! Core stage trait and outcome type.
//!
//! Every pipeline component implements [`Stage`]. A stage inspects the
//! request and the mutable [`RequestContext`] and yields exactly one
//! [`StageOutcome`]: pass the request on, allow it terminally, or
//! intercept it with a finished response. The pipeline folds the ordered
//! stage list over these outcomes, which keeps the chain's ordering
//! explicit and each stage testable in isolation. There is no nested
//! conditional ladder and no stage can call back into the chain.

use std::future::Future;
use std::pin::Pin;

use crate::context::RequestContext;
use crate::types::{Request, Response};

/// A boxed future, as returned by [`Stage::apply`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a stage decided about the request.
#[derive(Debug)]
pub enum StageOutcome {
    /// No decision; run the next stage.
    Continue,
    /// Terminal allow: serve the request as-is, skipping the remaining
    /// stages. Produced by the fast paths (static assets, API routes
    /// that passed their security policy).
    Allow,
    /// Terminal intercept: reply with this response instead of serving
    /// the request (CORS preflight, 429/403 rejections, redirects).
    Intercept(Response),
}

impl StageOutcome {
    /// Returns true for the two terminal variants.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// One stage of the request pipeline.
///
/// # Invariants
///
/// - Stages run in the fixed order the pipeline was built with.
/// - A stage must not assume later stages run: any state it writes into
///   the context must be consistent even if it terminates the request.
/// - Stages must not panic on upstream failure; they degrade (anonymous
///   identity, "no access") and log instead.
pub trait Stage: Send + Sync + 'static {
    /// Returns the unique name of this stage, used for logging.
    fn name(&self) -> &'static str;

    /// Applies this stage to the request.
    fn apply<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: &'a Request,
    ) -> BoxFuture<'a, StageOutcome>;
}
