//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field '{field}': {reason}")]
    InvalidField {
        /// Configuration key that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Configuration file was not valid YAML for the model.
    #[error("failed to parse configuration file")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Source YAML error.
        source: serde_yaml::Error,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Bind host could not be resolved to an address.
    #[error("failed to resolve bind host")]
    HostResolution {
        /// Host name that failed to resolve.
        host: String,
        /// Source IO error.
        source: io::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        field: &'static str,
        value: Option<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            field,
            value,
            reason,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn invalid_field_message_names_field_and_reason() {
        let err = ConfigError::invalid(
            "url-prefix",
            Some("/x/".to_string()),
            "must not end with '/'",
        );
        assert_eq!(
            err.to_string(),
            "invalid configuration field 'url-prefix': must not end with '/'"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn io_error_preserves_source() {
        let err = ConfigError::Io {
            operation: "config.read",
            path: PathBuf::from("config.yml"),
            source: io::Error::other("boom"),
        };
        assert_eq!(err.to_string(), "filesystem operation failed");
        assert!(err.source().is_some());
    }
}
