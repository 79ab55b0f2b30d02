//! Sitewide access gate.
//!
//! When access protection is enabled, every page requires a valid
//! signed grant token in the `access-token` cookie. Visitors without
//! one are redirected to the access page, carrying the original path
//! so the grant flow can send them back.
//!
//! The access page itself, the access API, provider webhooks, and
//! static assets are exempt, otherwise nobody could ever get in.

use crate::context::RequestContext;
use crate::stages::static_assets::is_static_asset;
use crate::stage::{BoxFuture, Stage, StageOutcome};
use crate::types::{Request, Response, ResponseExt};
use std::sync::Arc;
use velvetrope_access::{AccessTokenSigner, ACCESS_TOKEN_COOKIE};
use velvetrope_config::RouteConfig;

/// Stage that enforces the sitewide access gate.
pub struct AccessGateStage {
    /// `None` when access protection is disabled.
    signer: Option<Arc<AccessTokenSigner>>,
    routes: RouteConfig,
}

impl AccessGateStage {
    /// Creates the stage. Pass `None` for `signer` to disable the gate.
    #[must_use]
    pub fn new(signer: Option<Arc<AccessTokenSigner>>, routes: RouteConfig) -> Self {
        Self { signer, routes }
    }

    /// Creates a disabled gate.
    #[must_use]
    pub fn disabled(routes: RouteConfig) -> Self {
        Self::new(None, routes)
    }

    fn is_exempt(&self, path: &str) -> bool {
        path == self.routes.access_path
            || path == self.routes.access_check_path
            || path.starts_with(&self.routes.access_api_path)
            || path.starts_with(&self.routes.webhooks_prefix)
            || is_static_asset(path)
    }

    fn challenge(&self, request: &Request) -> Response {
        let target = match request.uri().query() {
            Some(query) => format!("{}?{}", request.uri().path(), query),
            None => request.uri().path().to_string(),
        };
        let location = format!(
            "{}?redirect={}",
            self.routes.access_path,
            urlencoding::encode(&target)
        );
        Response::redirect(&location)
    }
}

impl Stage for AccessGateStage {
    fn name(&self) -> &'static str {
        "access_gate"
    }

    fn apply<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        request: &'a Request,
    ) -> BoxFuture<'a, StageOutcome> {
        Box::pin(async move {
            let Some(signer) = &self.signer else {
                return StageOutcome::Continue;
            };

            let path = request.uri().path();
            if self.is_exempt(path) {
                return StageOutcome::Continue;
            }

            match ctx.cookies().get(ACCESS_TOKEN_COOKIE) {
                Some(token) if signer.is_valid(token) => StageOutcome::Continue,
                _ => {
                    tracing::debug!(%path, "access grant missing or invalid");
                    StageOutcome::Intercept(self.challenge(request))
                }
            }
        })
    }
}
