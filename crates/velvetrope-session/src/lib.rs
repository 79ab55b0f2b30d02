//! # Velvetrope Session
//!
//! The auth-provider seam for the velvetrope pipeline.
//!
//! Session state is owned by an external auth provider and lives in its
//! cookies; velvetrope only needs two questions answered per request:
//!
//! 1. *Who is this?* [`AuthProvider::refresh_session`] runs the
//!    provider's cookie-sync protocol. It may rotate tokens mid-request,
//!    which is why it reports cookie mutations instead of writing
//!    headers itself: the session stage writes them through the shared
//!    cookie jar so later stages and the browser both observe them.
//! 2. *Have they onboarded?* [`ProfileStore::onboarding_completed`],
//!    one lookup per authenticated page request.
//!
//! [`HttpAuthProvider`]/[`HttpProfileStore`] implement the traits
//! against the hosted provider's API; [`fixtures`] has in-memory
//! counting doubles for tests.

#![doc(html_root_url = "https://docs.rs/velvetrope-session/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;
mod http;
mod provider;

pub use http::{HttpAuthProvider, HttpProfileStore, REFRESH_COOKIE, SESSION_COOKIE};
pub use provider::{AuthProvider, BoxFuture, ProfileStore, SessionRefresh};
