//! Error types for configuration loading.
//!
//! The gameplay core is infallible; only the JSON edges can fail.

use std::fmt;

/// Failure to load a `Tuning` or `Settings` document.
#[derive(Debug)]
pub enum ConfigError {
    /// The document is not valid JSON for the target type.
    Parse(serde_json::Error),
    /// A field parsed but holds a value the game cannot run with.
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(err) => write!(f, "malformed config: {err}"),
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid value for `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// Result type for config loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
