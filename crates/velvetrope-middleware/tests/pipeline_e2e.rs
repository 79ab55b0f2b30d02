//! End-to-end pipeline integration tests.
//!
//! These tests wire all 7 stages together in their canonical order and
//! verify the verdicts a full edge deployment would produce:
//!
//! 1. Static assets - asset fast path
//! 2. CORS preflight - OPTIONS interception
//! 3. API security - rate limiting and CSRF for API routes
//! 4. Locale - locale resolution and prefix normalization
//! 5. Session - identity establishment
//! 6. Access gate - sitewide password wall
//! 7. Route guard - login and onboarding redirects

use bytes::Bytes;
use http::header::{LOCATION, SET_COOKIE};
use http::{Method, Request as HttpRequest, StatusCode};
use http_body_util::Full;
use std::sync::Arc;
use velvetrope_access::{AccessTokenSigner, ACCESS_TOKEN_COOKIE};
use velvetrope_config::{LocaleConfig, RouteConfig, SecurityConfig};
use velvetrope_core::{SessionUser, SetCookie};
use velvetrope_middleware::stages::{
    AccessGateStage, ApiSecurityStage, CorsPreflightStage, LocaleStage, RouteGuardStage,
    SessionStage, StaticAssetStage,
};
use velvetrope_middleware::{InMemoryRateLimitStore, Pipeline, Request, Verdict};
use velvetrope_session::fixtures::{StaticAuthProvider, StaticProfileStore};
use velvetrope_session::SESSION_COOKIE;

const SECRET: &str = "an-integration-test-secret-of-32+";

/// Installs a test-writer subscriber so `RUST_LOG=debug cargo test`
/// shows the per-stage trace.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn signer() -> Arc<AccessTokenSigner> {
    Arc::new(AccessTokenSigner::new(SECRET).unwrap())
}

/// Builds the full 7-stage pipeline with injectable session doubles.
fn full_pipeline(
    provider: Arc<StaticAuthProvider>,
    profiles: Arc<StaticProfileStore>,
    gate: Option<Arc<AccessTokenSigner>>,
) -> Pipeline {
    Pipeline::builder()
        .add_stage(StaticAssetStage::new())
        .add_stage(CorsPreflightStage::new())
        .add_stage(ApiSecurityStage::new(
            SecurityConfig::default(),
            Arc::new(InMemoryRateLimitStore::new()),
        ))
        .add_stage(LocaleStage::new(LocaleConfig::default()))
        .add_stage(SessionStage::new(provider))
        .add_stage(AccessGateStage::new(gate, RouteConfig::default()))
        .add_stage(RouteGuardStage::new(profiles, RouteConfig::default()))
        .build()
}

/// Pipeline without the access gate, the common deployment.
fn open_pipeline(provider: Arc<StaticAuthProvider>, profiles: Arc<StaticProfileStore>) -> Pipeline {
    full_pipeline(provider, profiles, None)
}

fn get(uri: &str) -> Request {
    HttpRequest::builder()
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn get_with(uri: &str, headers: &[(&str, &str)]) -> Request {
    let mut builder = HttpRequest::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Full::new(Bytes::new())).unwrap()
}

fn location(verdict: &Verdict) -> &str {
    let Verdict::Intercept(response) = verdict else {
        panic!("expected intercept, got allow");
    };
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn static_assets_bypass_everything() {
    init_tracing();
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = full_pipeline(provider.clone(), profiles.clone(), Some(signer()));

    let verdict = pipeline.run(&get("/_next/static/chunks/main.js")).await;
    let Verdict::Allow(pass) = verdict else {
        panic!("expected allow");
    };

    // Untouched: no headers, no cookies, and no auth provider call.
    assert!(pass.headers.is_empty());
    assert!(pass.cookies.is_empty());
    assert_eq!(provider.calls(), 0);
    assert_eq!(profiles.calls(), 0);
}

#[tokio::test]
async fn preflight_never_reaches_session() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = open_pipeline(provider.clone(), profiles);

    let request = HttpRequest::builder()
        .method(Method::OPTIONS)
        .uri("/api/prompts")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let verdict = pipeline.run(&request).await;

    let Verdict::Intercept(response) = verdict else {
        panic!("expected intercept");
    };
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn api_routes_allow_with_security_headers_only() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = open_pipeline(provider.clone(), profiles);

    let Verdict::Allow(pass) = pipeline.run(&get("/api/prompts")).await else {
        panic!("expected allow");
    };
    assert_eq!(pass.headers.get("x-content-type-options").unwrap(), "nosniff");
    // API routes stop at the security stage.
    assert_eq!(provider.calls(), 0);
    assert!(pass.locale.is_none());
}

#[tokio::test]
async fn access_api_rate_limit_trips_on_sixth_attempt() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = open_pipeline(provider, profiles);
    let headers = [("x-forwarded-for", "203.0.113.7")];

    for attempt in 0..5 {
        let request = HttpRequest::builder()
            .method(Method::POST)
            .uri("/api/access")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert!(
            pipeline.run(&request).await.is_allow(),
            "attempt {} should pass",
            attempt + 1
        );
    }

    let request = HttpRequest::builder()
        .method(Method::POST)
        .uri("/api/access")
        .header(headers[0].0, headers[0].1)
        .body(Full::new(Bytes::new()))
        .unwrap();
    let Verdict::Intercept(response) = pipeline.run(&request).await else {
        panic!("expected intercept");
    };
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn cross_origin_access_post_is_rejected() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = open_pipeline(provider, profiles);

    let request = HttpRequest::builder()
        .method(Method::POST)
        .uri("/api/access")
        .header("origin", "https://evil.example")
        .header("host", "promptparty.io")
        .body(Full::new(Bytes::new()))
        .unwrap();

    let Verdict::Intercept(response) = pipeline.run(&request).await else {
        panic!("expected intercept");
    };
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn locale_prefix_is_normalized_before_auth_runs() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = open_pipeline(provider.clone(), profiles);

    let verdict = pipeline.run(&get("/fr/prompts/new")).await;
    assert_eq!(location(&verdict), "/prompts/new");
    // The redirect pins the locale for the follow-up request.
    let Verdict::Intercept(response) = verdict else {
        unreachable!()
    };
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("NEXT_LOCALE=fr"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn page_request_resolves_locale_and_identity() {
    let user = SessionUser::new(uuid::Uuid::new_v4());
    let provider = Arc::new(StaticAuthProvider::logged_in(user.clone()));
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = open_pipeline(provider, profiles);

    let request = get_with("/about", &[("accept-language", "fr-CH, en;q=0.5")]);
    let Verdict::Allow(pass) = pipeline.run(&request).await else {
        panic!("expected allow");
    };

    assert_eq!(pass.locale.as_deref(), Some("fr"));
    assert_eq!(pass.identity.user().map(|u| u.id), Some(user.id));
    // Fall-through allows carry the security headers.
    assert_eq!(pass.headers.get("x-frame-options").unwrap(), "DENY");
    // And the locale cookie write.
    assert!(pass.cookies.iter().any(|c| c.name == "NEXT_LOCALE"));
}

#[tokio::test]
async fn gated_site_redirects_anonymous_visitors() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = full_pipeline(provider, profiles, Some(signer()));

    let verdict = pipeline.run(&get("/about")).await;
    assert_eq!(location(&verdict), "/access?redirect=%2Fabout");
}

#[tokio::test]
async fn gated_site_admits_valid_grant() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = full_pipeline(provider, profiles, Some(signer()));

    let token = signer().issue().unwrap();
    let cookie = format!("{ACCESS_TOKEN_COOKIE}={token}");
    let verdict = pipeline.run(&get_with("/about", &[("cookie", &cookie)])).await;
    assert!(verdict.is_allow());
}

#[tokio::test]
async fn gate_exempts_webhooks() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = full_pipeline(provider, profiles, Some(signer()));

    // Webhook deliveries carry no cookies at all and must still land.
    let verdict = pipeline.run(&get("/api/webhooks/stripe")).await;
    assert!(verdict.is_allow());
}

#[tokio::test]
async fn protected_route_redirects_to_login_with_return_path() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = open_pipeline(provider, profiles);

    let verdict = pipeline.run(&get("/profile/settings")).await;
    assert_eq!(
        location(&verdict),
        "/auth/login?redirectTo=%2Fprofile%2Fsettings"
    );
}

#[tokio::test]
async fn unonboarded_user_is_redirected_everywhere_but_onboarding() {
    let user = SessionUser::new(uuid::Uuid::new_v4());
    let provider = Arc::new(StaticAuthProvider::logged_in(user));
    let profiles = Arc::new(StaticProfileStore::incomplete());
    let pipeline = open_pipeline(provider, profiles.clone());

    let verdict = pipeline.run(&get("/collections")).await;
    assert_eq!(location(&verdict), "/onboarding");

    let verdict = pipeline.run(&get("/onboarding")).await;
    assert!(verdict.is_allow());
}

#[tokio::test]
async fn session_rotation_survives_an_intercept() {
    init_tracing();
    // Provider rotates the session cookie, then the route guard
    // intercepts: the rotation must still reach the browser.
    let user = SessionUser::new(uuid::Uuid::new_v4());
    let provider = Arc::new(
        StaticAuthProvider::logged_in(user)
            .with_cookies(vec![SetCookie::new(SESSION_COOKIE, "rotated").http_only()]),
    );
    let profiles = Arc::new(StaticProfileStore::incomplete());
    let pipeline = open_pipeline(provider, profiles);

    let Verdict::Intercept(response) = pipeline.run(&get("/collections")).await else {
        panic!("expected intercept");
    };
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/onboarding");
    let cookies: Vec<_> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("sb-access-token=rotated")));
}

#[tokio::test]
async fn verdicts_are_stable_across_repeated_runs() {
    let provider = Arc::new(StaticAuthProvider::anonymous());
    let profiles = Arc::new(StaticProfileStore::completed());
    let pipeline = open_pipeline(provider, profiles);

    for _ in 0..3 {
        let verdict = pipeline.run(&get("/profile/settings")).await;
        assert_eq!(
            location(&verdict),
            "/auth/login?redirectTo=%2Fprofile%2Fsettings"
        );
    }
    for _ in 0..3 {
        assert!(pipeline.run(&get("/about")).await.is_allow());
    }
}
