//! Main configuration types.
//!
//! The velvetrope pipeline is configured entirely from the environment
//! (the deployment surface the original platform exposes), with built-in
//! defaults for the route tables that are product decisions rather than
//! deployment decisions: the API security policy map, the protected path
//! prefixes, and the supported locale set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

use crate::ConfigError;

/// Minimum length for the access-token signing secret.
pub const MIN_TOKEN_SECRET_LEN: usize = 32;

/// Rate limit rule for one route prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    /// Window length in milliseconds.
    pub window_ms: u64,
    /// Maximum requests allowed per client within one window.
    pub max_requests: u64,
}

impl RateLimitRule {
    /// The reference policy for login/access-check endpoints: 5 requests
    /// per 15 minutes, specifically to blunt brute-force attempts.
    #[must_use]
    pub const fn brute_force_guard() -> Self {
        Self {
            window_ms: 15 * 60 * 1000,
            max_requests: 5,
        }
    }
}

/// Security policy for one API route prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePolicy {
    /// Literal path prefix this policy applies to.
    pub prefix: String,
    /// Whether Origin/Host CSRF checking applies to non-GET requests.
    pub csrf_enabled: bool,
    /// Rate limiting rule; `None` disables rate limiting for the prefix.
    pub rate_limit: Option<RateLimitRule>,
}

/// The per-route security policy table for API routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Policies in declaration order. More specific prefixes win via
    /// longest-prefix matching; a duplicated prefix resolves to its
    /// last declaration.
    pub policies: Vec<RoutePolicy>,
}

impl SecurityConfig {
    /// Selects the policy whose prefix is the longest match for `path`.
    ///
    /// Returns `None` when no prefix matches; such paths get generic
    /// security headers but no rate limit or CSRF constraints.
    #[must_use]
    pub fn match_policy(&self, path: &str) -> Option<&RoutePolicy> {
        self.policies
            .iter()
            .filter(|p| path.starts_with(&p.prefix))
            .max_by_key(|p| p.prefix.len())
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            policies: vec![RoutePolicy {
                prefix: "/api/access".to_string(),
                csrf_enabled: true,
                rate_limit: Some(RateLimitRule::brute_force_guard()),
            }],
        }
    }
}

/// Sitewide access gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AccessGateConfig {
    /// Whether `ACCESS_PROTECTION_ENABLED` was set to `"true"`.
    pub enabled: bool,
    /// SHA-256 hex digest of the sitewide password.
    pub password_hash: Option<String>,
    /// Secret used to sign/verify access tokens. Must be at least
    /// [`MIN_TOKEN_SECRET_LEN`] characters when the gate is active.
    pub token_secret: Option<String>,
}

impl AccessGateConfig {
    /// Returns true if the gate is actually in force: the flag is set
    /// *and* a password hash is configured. Either alone is not enough.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.password_hash.is_some()
    }
}

/// External auth provider endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AuthProviderConfig {
    /// Base URL of the auth provider's public API.
    pub url: String,
    /// The provider's publishable (anon) API key.
    pub publishable_key: String,
}

/// Locale negotiation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Supported locale codes.
    pub supported: Vec<String>,
    /// Locale used when neither cookie nor `Accept-Language` resolves.
    pub default_locale: String,
}

impl LocaleConfig {
    /// Returns true if `code` is a supported locale.
    #[must_use]
    pub fn is_supported(&self, code: &str) -> bool {
        self.supported.iter().any(|l| l == code)
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            supported: vec!["en".to_string(), "fr".to_string()],
            default_locale: "en".to_string(),
        }
    }
}

/// Route tables for protection, gating and redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Path prefixes that require a logged-in user.
    pub protected_prefixes: Vec<String>,
    /// Login page; unauthenticated access to a protected path redirects
    /// here with a `redirectTo` query parameter.
    pub login_path: String,
    /// Access-entry page; gate failures redirect here with a `redirect`
    /// query parameter.
    pub access_path: String,
    /// Onboarding flow; incomplete profiles are forced here.
    pub onboarding_path: String,
    /// Prefix of the auth section (`/auth/*`), exempt from the
    /// onboarding redirect to avoid loops.
    pub auth_prefix: String,
    /// Webhook API prefix; must stay reachable for third-party callers
    /// regardless of the access gate.
    pub webhooks_prefix: String,
    /// The access-entry API endpoint (exempt from the gate).
    pub access_api_path: String,
    /// The access-check API endpoint (exempt from the gate).
    pub access_check_path: String,
}

impl RouteConfig {
    /// Returns true if `path` falls under a protected prefix.
    #[must_use]
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes.iter().any(|p| path.starts_with(p))
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: vec![
                "/prompts/new".to_string(),
                "/collections".to_string(),
                "/profile/settings".to_string(),
            ],
            login_path: "/auth/login".to_string(),
            access_path: "/access".to_string(),
            onboarding_path: "/onboarding".to_string(),
            auth_prefix: "/auth".to_string(),
            webhooks_prefix: "/api/webhooks".to_string(),
            access_api_path: "/api/access".to_string(),
            access_check_path: "/api/access/check".to_string(),
        }
    }
}

/// Complete velvetrope configuration.
///
/// # Example
///
/// ```
/// use velvetrope_config::EdgeConfig;
///
/// let config = EdgeConfig::default();
/// assert_eq!(config.locale.default_locale, "en");
/// assert!(!config.access.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EdgeConfig {
    /// Sitewide access gate.
    #[serde(default)]
    pub access: AccessGateConfig,

    /// External auth provider.
    #[serde(default)]
    pub auth: AuthProviderConfig,

    /// Locale negotiation.
    #[serde(default)]
    pub locale: LocaleConfig,

    /// API security policies.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Route tables.
    #[serde(default)]
    pub routes: RouteConfig,

    /// Whether this is a production deployment (controls the `Secure`
    /// cookie attribute).
    #[serde(default)]
    pub production: bool,
}

impl EdgeConfig {
    /// Loads configuration from the process environment.
    ///
    /// A `.env` file is loaded first when present (ignored when absent).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable fails to parse or the
    /// resulting configuration does not validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_env_map(&vars)
    }

    /// Loads configuration from an explicit variable map.
    ///
    /// Split out from [`EdgeConfig::from_env`] so tests can exercise the
    /// loading logic without mutating process-global state.
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = vars.get("ACCESS_PROTECTION_ENABLED") {
            config.access.enabled = parse_bool("ACCESS_PROTECTION_ENABLED", value)?;
        }
        config.access.password_hash = vars.get("ACCESS_PASSWORD_HASH").cloned();
        config.access.token_secret = vars.get("ACCESS_TOKEN_SECRET").cloned();

        if let Some(url) = vars.get("AUTH_PROVIDER_URL") {
            config.auth.url.clone_from(url);
        }
        if let Some(key) = vars.get("AUTH_PROVIDER_ANON_KEY") {
            config.auth.publishable_key.clone_from(key);
        }

        if let Some(env_name) = vars.get("VELVETROPE_ENV") {
            config.production = env_name == "production";
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if:
    /// - the access gate is active but the signing secret is missing or
    ///   shorter than [`MIN_TOKEN_SECRET_LEN`] characters
    /// - the default locale is not in the supported set
    /// - a rate limit rule has a zero window or zero request budget
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access.is_active() {
            match &self.access.token_secret {
                None => {
                    return Err(ConfigError::missing_var("ACCESS_TOKEN_SECRET"));
                }
                Some(secret) if secret.len() < MIN_TOKEN_SECRET_LEN => {
                    return Err(ConfigError::invalid_value(
                        "access.token_secret",
                        format!("must be at least {MIN_TOKEN_SECRET_LEN} characters long"),
                    ));
                }
                Some(_) => {}
            }
        }

        if !self.locale.is_supported(&self.locale.default_locale) {
            return Err(ConfigError::invalid_value(
                "locale.default_locale",
                format!("'{}' is not a supported locale", self.locale.default_locale),
            ));
        }

        for policy in &self.security.policies {
            if let Some(rule) = &policy.rate_limit {
                if rule.window_ms == 0 || rule.max_requests == 0 {
                    return Err(ConfigError::invalid_value(
                        "security.policies",
                        format!(
                            "rate limit for '{}' must have a non-zero window and budget",
                            policy.prefix
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Parses a boolean environment value; only the literal `"true"` enables
/// a flag (matching the original deployment contract).
fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" | "" => Ok(false),
        other => Err(ConfigError::env_parse_error(
            var,
            format!("expected 'true' or 'false', got '{other}'"),
        )),
    }
}
