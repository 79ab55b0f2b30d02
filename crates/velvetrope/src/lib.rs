//! # Velvetrope
//!
//! **Edge middleware for Prompt Party**
//!
//! Velvetrope decides what happens to a request before the application
//! sees it: static assets skip everything, CORS preflights are
//! answered on the spot, API routes get rate limiting and CSRF checks,
//! pages get a locale, a session identity, the optional sitewide
//! access gate, and login/onboarding redirects.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use velvetrope::{Edge, Verdict};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let edge = Edge::from_env()?;
//!
//!     match edge.handle(&request).await {
//!         Verdict::Allow(pass) => {
//!             let mut response = serve(request).await;
//!             pass.apply_to(&mut response);
//!             // send response
//!         }
//!         Verdict::Intercept(response) => {
//!             // send response as-is
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Requests fold through a fixed, ordered stage list; the first
//! terminal outcome wins:
//!
//! ```text
//! Request → Static → CORS → ApiSecurity → Locale → Session → AccessGate → RouteGuard
//!              ↓ Allow  ↓ Intercept                             ↓ Intercept
//!           unchanged   204                              redirect (+ cookies)
//! ```

#![doc(html_root_url = "https://docs.rs/velvetrope/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod edge;

pub use edge::Edge;

// Re-export the component crates under stable names.
pub use velvetrope_access as access;
pub use velvetrope_config as config;
pub use velvetrope_core as core;
pub use velvetrope_middleware as middleware;
pub use velvetrope_session as session;

pub use velvetrope_config::EdgeConfig;
pub use velvetrope_core::{EdgeError, EdgeResult, Identity, SessionUser};
pub use velvetrope_middleware::{PassThrough, Request, Response, Verdict};
