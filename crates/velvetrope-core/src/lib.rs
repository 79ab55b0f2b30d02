//! # Velvetrope Core
//!
//! Shared types for the velvetrope edge pipeline.
//!
//! This crate carries the pieces every other velvetrope crate needs:
//!
//! - [`EdgeError`] - the standard error type with HTTP status mapping
//! - [`Identity`] - the resolved caller identity for one request
//! - [`CookieJar`] - the request-scoped cookie store that both the
//!   session refresher and the response finisher write through
//!
//! Policy rejections (429, 403) and access/auth redirects are *not*
//! errors in this model; they are ordinary pipeline verdicts. [`EdgeError`]
//! covers the genuinely exceptional paths: misconfiguration and upstream
//! provider failures.

#![doc(html_root_url = "https://docs.rs/velvetrope-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cookies;
pub mod error;
pub mod identity;

pub use cookies::{CookieJar, SameSite, SetCookie};
pub use error::{EdgeError, EdgeResult, ErrorCategory};
pub use identity::{Identity, SessionUser};
