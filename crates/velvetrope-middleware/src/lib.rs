//! # Velvetrope Middleware
//!
//! The edge pipeline: a fixed, ordered list of stages that every
//! request flows through before it reaches the application.
//!
//! Each [`Stage`](stage::Stage) inspects the request and the shared
//! [`RequestContext`](context::RequestContext), then votes with a
//! [`StageOutcome`](stage::StageOutcome): continue to the next stage,
//! allow the request out of the pipeline early, or intercept it with a
//! finished response. The [`Pipeline`](pipeline::Pipeline) folds the
//! list and turns the first terminal outcome into a
//! [`Verdict`](pipeline::Verdict) for the caller.
//!
//! The built-in stages live under [`stages`] in their canonical order:
//! static assets, CORS preflight, API security, locale, session,
//! access gate, route guard.
//!
//! ## Example
//!
//! ```ignore
//! use velvetrope_middleware::pipeline::Pipeline;
//! use velvetrope_middleware::stages::{CorsPreflightStage, StaticAssetStage};
//!
//! let pipeline = Pipeline::builder()
//!     .add_stage(StaticAssetStage::new())
//!     .add_stage(CorsPreflightStage::new())
//!     .build();
//! ```

#![doc(html_root_url = "https://docs.rs/velvetrope-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod pipeline;
pub mod rate_limit;
pub mod stage;
pub mod stages;
pub mod types;

pub use context::RequestContext;
pub use pipeline::{PassThrough, Pipeline, PipelineBuilder, Verdict};
pub use rate_limit::{InMemoryRateLimitStore, RateLimitDecision, RateLimitStore};
pub use stage::{BoxFuture, Stage, StageOutcome};
pub use types::{Request, Response, ResponseExt};
