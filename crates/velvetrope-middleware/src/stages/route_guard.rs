//! Route protection and onboarding redirect.
//!
//! Runs after the session stage, so the request identity is settled.
//! Anonymous visitors on protected routes are sent to the login page
//! with a `redirectTo` return path. Authenticated visitors who have
//! not finished onboarding are sent to the onboarding flow, except on
//! onboarding and auth pages themselves, which would loop.
//!
//! The profile lookup is advisory: if it fails, the visitor keeps
//! browsing and the application surfaces onboarding in its own UI.

use crate::context::RequestContext;
use crate::stage::{BoxFuture, Stage, StageOutcome};
use crate::types::{Request, Response, ResponseExt};
use http::header::{HeaderName, HeaderValue};
use std::sync::Arc;
use velvetrope_config::RouteConfig;
use velvetrope_session::ProfileStore;

/// Response header marking routes that required authentication.
pub const REQUIRES_AUTH_HEADER: &str = "x-requires-auth";

/// Stage that enforces login and onboarding requirements per route.
pub struct RouteGuardStage {
    profiles: Arc<dyn ProfileStore>,
    routes: RouteConfig,
}

impl RouteGuardStage {
    /// Creates the stage around a profile store.
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileStore>, routes: RouteConfig) -> Self {
        Self { profiles, routes }
    }

    fn login_redirect(&self, request: &Request) -> Response {
        let target = match request.uri().query() {
            Some(query) => format!("{}?{}", request.uri().path(), query),
            None => request.uri().path().to_string(),
        };
        let location = format!(
            "{}?redirectTo={}",
            self.routes.login_path,
            urlencoding::encode(&target)
        );
        Response::redirect(&location)
    }

    /// Onboarding is only checked on regular pages. Onboarding and
    /// auth paths are excluded so the redirect cannot loop.
    fn skips_onboarding_check(&self, path: &str) -> bool {
        Self::path_within(path, &self.routes.onboarding_path)
            || Self::path_within(path, &self.routes.auth_prefix)
    }

    /// True when `path` is `base` itself or a segment below it.
    /// `/onboarding-faq` is not within `/onboarding`.
    fn path_within(path: &str, base: &str) -> bool {
        path.strip_prefix(base)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

impl Stage for RouteGuardStage {
    fn name(&self) -> &'static str {
        "route_guard"
    }

    fn apply<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: &'a Request,
    ) -> BoxFuture<'a, StageOutcome> {
        Box::pin(async move {
            let path = request.uri().path();
            let protected = self.routes.is_protected(path);

            let user = match ctx.identity().user() {
                Some(user) => user.clone(),
                None => {
                    if protected {
                        tracing::debug!(%path, "anonymous visitor on protected route");
                        return StageOutcome::Intercept(self.login_redirect(request));
                    }
                    return StageOutcome::Continue;
                }
            };

            if !self.skips_onboarding_check(path) {
                match self.profiles.onboarding_completed(user.id).await {
                    Ok(false) => {
                        tracing::debug!(user = %user.id, %path, "redirecting to onboarding");
                        return StageOutcome::Intercept(Response::redirect(
                            &self.routes.onboarding_path,
                        ));
                    }
                    Ok(true) => {}
                    Err(error) => {
                        tracing::warn!(%error, user = %user.id, "profile lookup failed, skipping onboarding check");
                    }
                }
            }

            if protected {
                ctx.insert_response_header(
                    HeaderName::from_static(REQUIRES_AUTH_HEADER),
                    HeaderValue::from_static("true"),
                );
            }

            StageOutcome::Continue
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::header::LOCATION;
    use http::Request as HttpRequest;
    use http_body_util::Full;
    use velvetrope_core::{Identity, SessionUser};
    use velvetrope_session::fixtures::StaticProfileStore;

    fn request(uri: &str) -> Request {
        HttpRequest::builder()
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn stage(profiles: StaticProfileStore) -> RouteGuardStage {
        RouteGuardStage::new(Arc::new(profiles), RouteConfig::default())
    }

    fn authed_ctx() -> RequestContext {
        let mut ctx = RequestContext::new();
        ctx.set_identity(Identity::User(SessionUser::new(uuid::Uuid::new_v4())));
        ctx
    }

    #[tokio::test]
    async fn test_anonymous_on_protected_route_redirects_to_login() {
        let stage = stage(StaticProfileStore::completed());
        let mut ctx = RequestContext::new();
        let request = request("/prompts/new?draft=1");

        let outcome = stage.apply(&mut ctx, &request).await;
        let StageOutcome::Intercept(response) = outcome else {
            panic!("expected intercept");
        };
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/auth/login?redirectTo=%2Fprompts%2Fnew%3Fdraft%3D1"
        );
    }

    #[tokio::test]
    async fn test_anonymous_on_public_route_continues() {
        let store = StaticProfileStore::completed();
        let stage = stage(store);
        let mut ctx = RequestContext::new();

        let outcome = stage.apply(&mut ctx, &request("/about")).await;
        assert!(matches!(outcome, StageOutcome::Continue));
    }

    #[tokio::test]
    async fn test_onboarded_user_on_protected_route_continues() {
        let stage = stage(StaticProfileStore::completed());
        let mut ctx = authed_ctx();

        let outcome = stage.apply(&mut ctx, &request("/collections")).await;
        assert!(matches!(outcome, StageOutcome::Continue));
        assert_eq!(
            ctx.response_headers().get(REQUIRES_AUTH_HEADER).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_unonboarded_user_redirects_to_onboarding() {
        let stage = stage(StaticProfileStore::incomplete());
        let mut ctx = authed_ctx();

        let outcome = stage.apply(&mut ctx, &request("/about")).await;
        let StageOutcome::Intercept(response) = outcome else {
            panic!("expected intercept");
        };
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/onboarding");
    }

    #[tokio::test]
    async fn test_onboarding_page_never_loops() {
        let profiles = StaticProfileStore::incomplete();
        let stage = stage(profiles);
        let mut ctx = authed_ctx();

        let outcome = stage.apply(&mut ctx, &request("/onboarding")).await;
        assert!(matches!(outcome, StageOutcome::Continue));
    }

    #[tokio::test]
    async fn test_onboarding_lookalike_path_still_checked() {
        let stage = stage(StaticProfileStore::incomplete());
        let mut ctx = authed_ctx();

        let outcome = stage.apply(&mut ctx, &request("/onboarding-faq")).await;
        let StageOutcome::Intercept(response) = outcome else {
            panic!("expected intercept");
        };
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/onboarding");
    }

    #[tokio::test]
    async fn test_auth_pages_skip_onboarding_check() {
        let profiles = StaticProfileStore::incomplete();
        let stage = RouteGuardStage::new(Arc::new(profiles), RouteConfig::default());
        let mut ctx = authed_ctx();

        let outcome = stage.apply(&mut ctx, &request("/auth/logout")).await;
        assert!(matches!(outcome, StageOutcome::Continue));
    }

    #[tokio::test]
    async fn test_profile_lookup_failure_is_advisory() {
        let stage = stage(StaticProfileStore::failing());
        let mut ctx = authed_ctx();

        let outcome = stage.apply(&mut ctx, &request("/collections")).await;
        assert!(matches!(outcome, StageOutcome::Continue));
    }

    #[tokio::test]
    async fn test_public_route_has_no_auth_header() {
        let stage = stage(StaticProfileStore::completed());
        let mut ctx = authed_ctx();

        stage.apply(&mut ctx, &request("/about")).await;
        assert!(!ctx.response_headers().contains_key(REQUIRES_AUTH_HEADER));
    }

    #[test]
    fn test_stage_name() {
        assert_eq!(stage(StaticProfileStore::completed()).name(), "route_guard");
    }
}
