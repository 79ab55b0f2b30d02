//! Error types for velvetrope.
//!
//! This module provides the [`EdgeError`] type used throughout the
//! velvetrope pipeline.
//!
//! Per-request policy decisions (rate limiting, CSRF, access gating,
//! auth redirects) never surface as `EdgeError`: they are terminal
//! pipeline verdicts. `EdgeError` exists for the two remaining failure
//! classes the design distinguishes:
//!
//! - **Configuration** - deployment misconfiguration (e.g. a missing or
//!   too-short signing secret). Intentionally loud: raised once at
//!   startup or at the point the signing key is first requested.
//! - **Upstream** - the external auth provider or profile store failed.
//!   Recovered locally by the pipeline (the caller is treated as
//!   anonymous), logged as a warning, never propagated as a 5xx.

use http::StatusCode;
use thiserror::Error;

/// Result type alias using [`EdgeError`].
pub type EdgeResult<T> = Result<T, EdgeError>;

/// Categories of errors for classification and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Deployment/configuration errors (fail-fast).
    Config,
    /// Upstream provider failures (recovered to anonymous).
    Upstream,
    /// Token verification failures (recovered to "no access").
    Token,
    /// Internal invariant violations.
    Internal,
}

impl ErrorCategory {
    /// Returns the HTTP status code this category would map to if it
    /// ever had to be surfaced to a client.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Config | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream => StatusCode::BAD_GATEWAY,
            Self::Token => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Standard error type for velvetrope.
///
/// # Example
///
/// ```
/// use velvetrope_core::{EdgeError, ErrorCategory};
///
/// let err = EdgeError::config("ACCESS_TOKEN_SECRET must be at least 32 characters");
/// assert_eq!(err.category(), ErrorCategory::Config);
/// ```
#[derive(Error, Debug)]
pub enum EdgeError {
    /// Deployment misconfiguration. Raised at startup or the first time
    /// a signing key is requested, never per request.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description of what is misconfigured.
        message: String,
    },

    /// The external auth provider or profile store failed.
    #[error("upstream error ({operation}): {message}")]
    Upstream {
        /// The operation that was being performed (e.g. `refresh_session`).
        operation: String,
        /// Human-readable failure description.
        message: String,
    },

    /// A signed token failed verification (bad signature, wrong issuer,
    /// expired, malformed).
    #[error("token verification failed: {message}")]
    Token {
        /// Human-readable failure description.
        message: String,
    },

    /// Internal invariant violation.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable failure description.
        message: String,
    },
}

impl EdgeError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an upstream error for the given operation.
    pub fn upstream(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a token verification error.
    pub fn token(message: impl Into<String>) -> Self {
        Self::Token {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Config { .. } => ErrorCategory::Config,
            Self::Upstream { .. } => ErrorCategory::Upstream,
            Self::Token { .. } => ErrorCategory::Token,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns true if the pipeline should recover from this error by
    /// degrading to an anonymous / no-access result.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Token { .. })
    }
}
