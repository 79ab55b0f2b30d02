//! # Velvetrope Config
//!
//! Environment-driven configuration for the velvetrope edge pipeline.
//!
//! Configuration comes from two places:
//!
//! - the **environment** for deployment decisions: the access gate flag
//!   and secrets (`ACCESS_PROTECTION_ENABLED`, `ACCESS_PASSWORD_HASH`,
//!   `ACCESS_TOKEN_SECRET`), the auth provider endpoints
//!   (`AUTH_PROVIDER_URL`, `AUTH_PROVIDER_ANON_KEY`) and the deployment
//!   environment name (`VELVETROPE_ENV`);
//! - **built-in defaults** for product decisions: the API security
//!   policy table, protected path prefixes, and the supported locale
//!   set. These have setters via plain struct mutation before the
//!   pipeline is built.
//!
//! Loading is loud: a missing signing secret when the gate is enabled,
//! or a secret shorter than 32 characters, aborts startup instead of
//! degrading per-request behavior.
//!
//! ## Example
//!
//! ```no_run
//! use velvetrope_config::EdgeConfig;
//!
//! let config = EdgeConfig::from_env().expect("invalid configuration");
//! if config.access.is_active() {
//!     println!("sitewide access gate is ON");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/velvetrope-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;

pub use config::{
    AccessGateConfig, AuthProviderConfig, EdgeConfig, LocaleConfig, RateLimitRule, RouteConfig,
    RoutePolicy, SecurityConfig, MIN_TOKEN_SECRET_LEN,
};
pub use error::ConfigError;
