//! HTTP implementations of the provider traits.
//!
//! The production deployment uses a hosted auth provider with a
//! GoTrue-style API: sessions live in a pair of cookies (a short-lived
//! access token plus a refresh token), `GET /auth/v1/user` resolves an
//! access token to a user, and `POST /auth/v1/token` exchanges a refresh
//! token for a new pair. The profile store is the provider's REST
//! surface over the `profiles` table.

use serde::Deserialize;
use uuid::Uuid;
use velvetrope_config::AuthProviderConfig;
use velvetrope_core::{CookieJar, EdgeError, EdgeResult, SameSite, SessionUser, SetCookie};

use crate::provider::{AuthProvider, BoxFuture, ProfileStore, SessionRefresh};

/// Cookie holding the provider's short-lived access token.
pub const SESSION_COOKIE: &str = "sb-access-token";

/// Cookie holding the provider's refresh token.
pub const REFRESH_COOKIE: &str = "sb-refresh-token";

/// Refresh-token cookie lifetime: 30 days.
const REFRESH_COOKIE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Uuid,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    onboarding_completed: bool,
}

/// [`AuthProvider`] backed by the hosted auth provider's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpAuthProvider {
    client: reqwest::Client,
    base_url: String,
    publishable_key: String,
    production: bool,
}

impl HttpAuthProvider {
    /// Creates a provider client from configuration.
    #[must_use]
    pub fn new(config: &AuthProviderConfig, production: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            publishable_key: config.publishable_key.clone(),
            production,
        }
    }

    /// Resolves an access token to a user.
    ///
    /// A 401 means the token is stale (candidate for refresh), not an
    /// upstream failure.
    async fn fetch_user(&self, access_token: &str) -> EdgeResult<Option<SessionUser>> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.publishable_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| EdgeError::upstream("fetch_user", e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(EdgeError::upstream(
                "fetch_user",
                format!("unexpected status {}", response.status()),
            ));
        }

        let payload: UserPayload = response
            .json()
            .await
            .map_err(|e| EdgeError::upstream("fetch_user", e.to_string()))?;

        Ok(Some(SessionUser {
            id: payload.id,
            email: payload.email,
        }))
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// Client errors (revoked/expired refresh token) yield `None`;
    /// only transport and server failures are upstream errors.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> EdgeResult<Option<TokenGrant>> {
        let response = self
            .client
            .post(format!(
                "{}/auth/v1/token?grant_type=refresh_token",
                self.base_url
            ))
            .header("apikey", &self.publishable_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| EdgeError::upstream("exchange_refresh_token", e.to_string()))?;

        if response.status().is_client_error() {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(EdgeError::upstream(
                "exchange_refresh_token",
                format!("unexpected status {}", response.status()),
            ));
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|e| EdgeError::upstream("exchange_refresh_token", e.to_string()))?;

        Ok(Some(grant))
    }

    /// Builds the cookie rotations for a fresh token grant.
    fn grant_cookies(&self, grant: &TokenGrant) -> Vec<SetCookie> {
        vec![
            SetCookie::new(SESSION_COOKIE, &grant.access_token)
                .max_age(grant.expires_in)
                .http_only()
                .secure(self.production)
                .same_site(SameSite::Lax),
            SetCookie::new(REFRESH_COOKIE, &grant.refresh_token)
                .max_age(REFRESH_COOKIE_TTL_SECS)
                .http_only()
                .secure(self.production)
                .same_site(SameSite::Lax),
        ]
    }
}

impl AuthProvider for HttpAuthProvider {
    fn refresh_session<'a>(
        &'a self,
        jar: &'a CookieJar,
    ) -> BoxFuture<'a, EdgeResult<SessionRefresh>> {
        Box::pin(async move {
            let access_token = jar.get(SESSION_COOKIE);
            let refresh_token = jar.get(REFRESH_COOKIE);

            // Fast path: the access token still resolves.
            if let Some(token) = access_token {
                if let Some(user) = self.fetch_user(token).await? {
                    return Ok(SessionRefresh {
                        user: Some(user),
                        cookies: Vec::new(),
                    });
                }
            }

            // Stale or absent access token: try the refresh token.
            let Some(refresh) = refresh_token else {
                return Ok(SessionRefresh::anonymous());
            };
            let Some(grant) = self.exchange_refresh_token(refresh).await? else {
                tracing::debug!("refresh token rejected, treating caller as anonymous");
                return Ok(SessionRefresh::anonymous());
            };

            let user = self.fetch_user(&grant.access_token).await?;
            Ok(SessionRefresh {
                user,
                cookies: self.grant_cookies(&grant),
            })
        })
    }
}

/// [`ProfileStore`] backed by the provider's REST surface.
#[derive(Debug, Clone)]
pub struct HttpProfileStore {
    client: reqwest::Client,
    base_url: String,
    publishable_key: String,
}

impl HttpProfileStore {
    /// Creates a profile store client from configuration.
    #[must_use]
    pub fn new(config: &AuthProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            publishable_key: config.publishable_key.clone(),
        }
    }
}

impl ProfileStore for HttpProfileStore {
    fn onboarding_completed<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, EdgeResult<bool>> {
        Box::pin(async move {
            let response = self
                .client
                .get(format!("{}/rest/v1/profiles", self.base_url))
                .query(&[
                    ("user_id", format!("eq.{user_id}")),
                    ("select", "onboarding_completed".to_string()),
                ])
                .header("apikey", &self.publishable_key)
                .bearer_auth(&self.publishable_key)
                .send()
                .await
                .map_err(|e| EdgeError::upstream("onboarding_completed", e.to_string()))?;

            if !response.status().is_success() {
                return Err(EdgeError::upstream(
                    "onboarding_completed",
                    format!("unexpected status {}", response.status()),
                ));
            }

            let rows: Vec<ProfileRow> = response
                .json()
                .await
                .map_err(|e| EdgeError::upstream("onboarding_completed", e.to_string()))?;

            // No profile row yet: the onboarding redirect only fires on
            // an explicit false.
            Ok(rows.first().map_or(true, |row| row.onboarding_completed))
        })
    }
}
