//! Session refresh and identity establishment.
//!
//! Delegates to an [`AuthProvider`] to validate or refresh the auth
//! session from the request's cookies. Rotated cookies are written
//! through the jar, so later stages see the fresh values and the
//! response carries the matching `Set-Cookie` headers whether the
//! request is allowed or intercepted.
//!
//! This stage never blocks a request: a provider failure degrades to
//! an anonymous identity and the route guard decides what anonymous
//! visitors may see.

use crate::context::RequestContext;
use crate::stage::{BoxFuture, Stage, StageOutcome};
use crate::types::Request;
use std::sync::Arc;
use velvetrope_core::Identity;
use velvetrope_session::AuthProvider;

/// Stage that refreshes the session and sets the request identity.
pub struct SessionStage {
    provider: Arc<dyn AuthProvider>,
}

impl SessionStage {
    /// Creates the stage around an auth provider.
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }
}

impl Stage for SessionStage {
    fn name(&self) -> &'static str {
        "session"
    }

    fn apply<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        _request: &'a Request,
    ) -> BoxFuture<'a, StageOutcome> {
        Box::pin(async move {
            let refresh = match self.provider.refresh_session(ctx.cookies()).await {
                Ok(refresh) => refresh,
                Err(error) => {
                    tracing::warn!(%error, "session refresh failed, continuing anonymously");
                    ctx.set_identity(Identity::Anonymous);
                    return StageOutcome::Continue;
                }
            };

            for cookie in refresh.cookies {
                ctx.cookies_mut().set(cookie);
            }

            match refresh.user {
                Some(user) => {
                    tracing::debug!(user = %user.id, "session established");
                    ctx.set_identity(Identity::User(user));
                }
                None => ctx.set_identity(Identity::Anonymous),
            }

            StageOutcome::Continue
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::Request as HttpRequest;
    use http_body_util::Full;
    use velvetrope_core::{SessionUser, SetCookie};
    use velvetrope_session::fixtures::StaticAuthProvider;
    use velvetrope_session::SESSION_COOKIE;

    fn request() -> Request {
        HttpRequest::builder()
            .uri("/prompts/new")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn user() -> SessionUser {
        SessionUser::new(uuid::Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_logged_in_user_sets_identity() {
        let provider = Arc::new(StaticAuthProvider::logged_in(user()));
        let stage = SessionStage::new(provider.clone());
        let mut ctx = RequestContext::new();

        let outcome = stage.apply(&mut ctx, &request()).await;
        assert!(matches!(outcome, StageOutcome::Continue));
        assert!(ctx.identity().is_authenticated());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_refresh() {
        let stage = SessionStage::new(Arc::new(StaticAuthProvider::anonymous()));
        let mut ctx = RequestContext::new();

        stage.apply(&mut ctx, &request()).await;
        assert!(!ctx.identity().is_authenticated());
        assert!(ctx.cookies().pending().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_anonymous() {
        let stage = SessionStage::new(Arc::new(StaticAuthProvider::failing()));
        let mut ctx = RequestContext::new();

        let outcome = stage.apply(&mut ctx, &request()).await;
        assert!(matches!(outcome, StageOutcome::Continue));
        assert!(!ctx.identity().is_authenticated());
    }

    #[tokio::test]
    async fn test_rotated_cookies_written_through_jar() {
        let provider = StaticAuthProvider::logged_in(user())
            .with_cookies(vec![SetCookie::new(SESSION_COOKIE, "rotated-token").http_only()]);
        let stage = SessionStage::new(Arc::new(provider));
        let mut ctx = RequestContext::new();

        stage.apply(&mut ctx, &request()).await;
        // Later stages read the fresh value.
        assert_eq!(ctx.cookies().get(SESSION_COOKIE), Some("rotated-token"));
        // And the response will carry the write.
        assert_eq!(ctx.cookies().pending().len(), 1);
    }

    #[test]
    fn test_stage_name() {
        let stage = SessionStage::new(Arc::new(StaticAuthProvider::anonymous()));
        assert_eq!(stage.name(), "session");
    }
}
