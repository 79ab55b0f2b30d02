//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading.
///
/// Configuration errors are startup/deployment conditions and are
/// intentionally loud: they abort process startup rather than degrading
/// per-request behavior.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {var}")]
    MissingVar {
        /// The missing variable name.
        var: String,
    },

    /// An environment variable could not be parsed.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvParseError {
        /// The environment variable name.
        var: String,
        /// Explanation of the parsing error.
        reason: String,
    },

    /// Invalid configuration value.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// The field with the invalid value.
        field: String,
        /// Explanation of why the value is invalid.
        reason: String,
    },

    /// Validation error after loading.
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

impl ConfigError {
    /// Creates a missing-variable error.
    pub fn missing_var(var: impl Into<String>) -> Self {
        Self::MissingVar { var: var.into() }
    }

    /// Creates an environment parsing error.
    pub fn env_parse_error(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid-value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_var_display() {
        let err = ConfigError::missing_var("ACCESS_TOKEN_SECRET");
        assert!(err.to_string().contains("ACCESS_TOKEN_SECRET"));
    }

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::invalid_value("access.token_secret", "shorter than 32 characters");
        let msg = err.to_string();
        assert!(msg.contains("access.token_secret"));
        assert!(msg.contains("32"));
    }
}
