//! The fully wired edge.

use std::sync::Arc;
use velvetrope_access::AccessTokenSigner;
use velvetrope_config::EdgeConfig;
use velvetrope_core::{EdgeError, EdgeResult, SetCookie};
use velvetrope_middleware::stages::{
    AccessGateStage, ApiSecurityStage, CorsPreflightStage, LocaleStage, RouteGuardStage,
    SessionStage, StaticAssetStage,
};
use velvetrope_middleware::{InMemoryRateLimitStore, Pipeline, RateLimitStore, Request, Verdict};
use velvetrope_session::{AuthProvider, HttpAuthProvider, HttpProfileStore, ProfileStore};

/// The edge: configuration plus the canonical 7-stage pipeline.
///
/// Construction is the only place that can fail. Once an [`Edge`]
/// exists, every request gets a verdict; degraded dependencies produce
/// anonymous identities and skipped checks, never errors.
pub struct Edge {
    config: EdgeConfig,
    signer: Option<Arc<AccessTokenSigner>>,
    pipeline: Pipeline,
}

impl Edge {
    /// Loads configuration from the environment and wires the edge
    /// against the hosted auth provider.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration, including an active access gate
    /// with a missing or too-short `ACCESS_TOKEN_SECRET`.
    pub fn from_env() -> EdgeResult<Self> {
        let config = EdgeConfig::from_env().map_err(|e| EdgeError::config(e.to_string()))?;
        Self::new(config)
    }

    /// Wires the edge from explicit configuration, using the HTTP auth
    /// provider and profile store.
    pub fn new(config: EdgeConfig) -> EdgeResult<Self> {
        let provider = Arc::new(HttpAuthProvider::new(&config.auth, config.production));
        let profiles = Arc::new(HttpProfileStore::new(&config.auth));
        Self::with_providers(config, provider, profiles)
    }

    /// Wires the edge with injected session dependencies.
    ///
    /// This is the constructor tests and embedders use; [`Edge::new`]
    /// delegates here with the HTTP implementations.
    pub fn with_providers(
        config: EdgeConfig,
        provider: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> EdgeResult<Self> {
        config
            .validate()
            .map_err(|e| EdgeError::config(e.to_string()))?;

        let signer = if config.access.is_active() {
            let secret = config
                .access
                .token_secret
                .as_deref()
                .ok_or_else(|| EdgeError::config("ACCESS_TOKEN_SECRET is required"))?;
            Some(Arc::new(AccessTokenSigner::new(secret)?))
        } else {
            None
        };

        let store: Arc<dyn RateLimitStore> = Arc::new(InMemoryRateLimitStore::new());
        let pipeline = Pipeline::builder()
            .add_stage(StaticAssetStage::new())
            .add_stage(CorsPreflightStage::new())
            .add_stage(ApiSecurityStage::new(config.security.clone(), store))
            .add_stage(LocaleStage::new(config.locale.clone()))
            .add_stage(SessionStage::new(provider))
            .add_stage(AccessGateStage::new(
                signer.clone(),
                config.routes.clone(),
            ))
            .add_stage(RouteGuardStage::new(profiles, config.routes.clone()))
            .build();

        tracing::info!(
            stages = pipeline.stage_count(),
            access_gate = signer.is_some(),
            production = config.production,
            "edge wired"
        );

        Ok(Self {
            config,
            signer,
            pipeline,
        })
    }

    /// Runs a request through the pipeline.
    pub async fn handle(&self, request: &Request) -> Verdict {
        self.pipeline.run(request).await
    }

    /// Exchanges the gate password for an access-token cookie.
    ///
    /// Returns `Ok(None)` on a wrong password. This is the server half
    /// of the access-entry endpoint.
    ///
    /// # Errors
    ///
    /// Fails when the access gate is not active, or on a signing error.
    pub fn grant_access(&self, password: &str) -> EdgeResult<Option<SetCookie>> {
        let (Some(signer), Some(hash)) = (&self.signer, &self.config.access.password_hash) else {
            return Err(EdgeError::config("access protection is not active"));
        };
        velvetrope_access::grant(signer, password, hash, self.config.production)
    }

    /// The configuration this edge was wired from.
    #[must_use]
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// The underlying pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}
