//! Test fixtures for velvetrope development and testing.
//!
//! In-memory [`AuthProvider`]/[`ProfileStore`] implementations with call
//! counters, used across the velvetrope crates to assert which pipeline
//! stages actually ran for a given request.
//!
//! # Example
//!
//! ```
//! use velvetrope_session::fixtures::StaticAuthProvider;
//! use velvetrope_session::AuthProvider;
//! use velvetrope_core::CookieJar;
//!
//! # tokio_test::block_on(async {
//! let provider = StaticAuthProvider::anonymous();
//! let jar = CookieJar::new();
//! let refresh = provider.refresh_session(&jar).await.unwrap();
//! assert!(refresh.user.is_none());
//! assert_eq!(provider.calls(), 1);
//! # });
//! ```

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;
use velvetrope_core::{CookieJar, EdgeError, EdgeResult, SessionUser, SetCookie};

use crate::provider::{AuthProvider, BoxFuture, ProfileStore, SessionRefresh};

/// An [`AuthProvider`] that returns a fixed result and counts calls.
#[derive(Debug, Default)]
pub struct StaticAuthProvider {
    user: Option<SessionUser>,
    cookies: Mutex<Vec<SetCookie>>,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticAuthProvider {
    /// A provider that always reports no session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A provider that always reports the given user.
    #[must_use]
    pub fn logged_in(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            ..Self::default()
        }
    }

    /// A provider that always fails with an upstream error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Adds cookie rotations to every refresh result.
    #[must_use]
    pub fn with_cookies(self, cookies: Vec<SetCookie>) -> Self {
        *self.cookies.lock() = cookies;
        self
    }

    /// Number of times `refresh_session` was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AuthProvider for StaticAuthProvider {
    fn refresh_session<'a>(
        &'a self,
        _jar: &'a CookieJar,
    ) -> BoxFuture<'a, EdgeResult<SessionRefresh>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if self.fail {
                return Err(EdgeError::upstream("refresh_session", "fixture failure"));
            }
            Ok(SessionRefresh {
                user: self.user.clone(),
                cookies: self.cookies.lock().clone(),
            })
        })
    }
}

/// A [`ProfileStore`] that returns a fixed onboarding flag and counts calls.
#[derive(Debug)]
pub struct StaticProfileStore {
    completed: bool,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticProfileStore {
    /// A store reporting every profile as onboarded.
    #[must_use]
    pub fn completed() -> Self {
        Self {
            completed: true,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A store reporting every profile as not yet onboarded.
    #[must_use]
    pub fn incomplete() -> Self {
        Self {
            completed: false,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A store that always fails with an upstream error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            completed: true,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `onboarding_completed` was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProfileStore for StaticProfileStore {
    fn onboarding_completed<'a>(&'a self, _user_id: Uuid) -> BoxFuture<'a, EdgeResult<bool>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if self.fail {
                return Err(EdgeError::upstream("onboarding_completed", "fixture failure"));
            }
            Ok(self.completed)
        })
    }
}
