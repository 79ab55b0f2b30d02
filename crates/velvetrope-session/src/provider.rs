//! The auth provider seam.
//!
//! The pipeline never talks to the auth provider directly; it goes
//! through two narrow traits so the wiring can swap an HTTP
//! implementation for in-memory fixtures in tests:
//!
//! - [`AuthProvider`] - the cookie-sync session refresh protocol. Given
//!   the request's cookies it returns the current user (or none) plus
//!   any cookie rotations the provider wants persisted.
//! - [`ProfileStore`] - one lookup: has this user completed onboarding?

use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;
use velvetrope_core::{CookieJar, EdgeResult, SessionUser, SetCookie};

/// A boxed future, as returned by provider trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of one session refresh.
#[derive(Debug, Clone, Default)]
pub struct SessionRefresh {
    /// The current user, when the incoming cookies resolve to a valid
    /// (possibly just-refreshed) session.
    pub user: Option<SessionUser>,
    /// Cookie rotations to persist. The session stage writes these
    /// through the request's [`CookieJar`] so both later stages and the
    /// browser observe them.
    pub cookies: Vec<SetCookie>,
}

impl SessionRefresh {
    /// A refresh that found no session and rotates nothing.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// The external auth provider's cookie-based session protocol.
///
/// Implementations must not panic on provider failure; they return an
/// upstream error which the pipeline degrades to "no user".
pub trait AuthProvider: Send + Sync {
    /// Refreshes/validates the session carried by the request cookies.
    fn refresh_session<'a>(&'a self, jar: &'a CookieJar) -> BoxFuture<'a, EdgeResult<SessionRefresh>>;
}

/// Per-user onboarding flag lookup.
pub trait ProfileStore: Send + Sync {
    /// Returns whether the user has completed onboarding.
    ///
    /// A user with no profile row yet is reported as completed: the
    /// onboarding redirect only fires on an explicit `false`, matching
    /// the product behavior of profiles being created by the onboarding
    /// flow itself.
    fn onboarding_completed<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, EdgeResult<bool>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_refresh() {
        let refresh = SessionRefresh::anonymous();
        assert!(refresh.user.is_none());
        assert!(refresh.cookies.is_empty());
    }
}
