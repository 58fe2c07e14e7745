//! # Design
//!
//! - Centralize application-level errors for bootstrap.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: sfs_config::ConfigError,
    },
    /// Credential store operations failed.
    #[error("credential operation failed")]
    Credentials {
        /// Operation identifier.
        operation: &'static str,
        /// Source credential error.
        source: sfs_credentials::CredentialError,
    },
    /// Listener operations failed.
    #[error("server operation failed")]
    Server {
        /// Operation identifier.
        operation: &'static str,
        /// Source server error.
        source: sfs_http::ServerError,
    },
    /// A blocking task did not complete.
    #[error("background task failed")]
    Task {
        /// Operation identifier.
        operation: &'static str,
        /// Source join error.
        source: tokio::task::JoinError,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: sfs_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn credentials(
        operation: &'static str,
        source: sfs_credentials::CredentialError,
    ) -> Self {
        Self::Credentials { operation, source }
    }

    pub(crate) const fn server(operation: &'static str, source: sfs_http::ServerError) -> Self {
        Self::Server { operation, source }
    }
}
