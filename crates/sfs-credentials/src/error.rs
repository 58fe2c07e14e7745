//! Error types for credential store operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for credential operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Credential file does not exist.
    #[error("credential file not found")]
    FileMissing {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// File system operation failed.
    #[error("credential file operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Credential file is not a valid username table.
    #[error("failed to parse credential file")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// Credential table could not be serialized.
    #[error("failed to serialize credentials")]
    Serialize {
        /// Source JSON error.
        source: serde_json::Error,
    },
    /// Operating system randomness was unavailable.
    #[error("failed to generate password salt")]
    Entropy {
        /// Source randomness error.
        source: rand::rand_core::OsError,
    },
    /// Username is already present.
    #[error("user already exists")]
    AlreadyExists {
        /// Conflicting username.
        username: String,
    },
    /// Username is not present.
    #[error("user does not exist")]
    NotFound {
        /// Missing username.
        username: String,
    },
    /// Username was empty.
    #[error("username may not be empty")]
    EmptyUsername,
    /// Password was empty.
    #[error("password may not be empty")]
    EmptyPassword,
    /// Password and confirmation differed.
    #[error("passwords do not match")]
    PasswordMismatch,
    /// Key derivation rejected its inputs.
    #[error("failed to derive password hash")]
    Derive {
        /// Key derivation error detail.
        detail: argon2::Error,
    },
    /// Stored salt or hash was not valid base64.
    #[error("stored credential is not valid base64")]
    Encoding {
        /// Source decoding error.
        source: base64::DecodeError,
    },
    /// Password prompt could not be shown or read.
    #[error("failed to read password")]
    Prompt {
        /// Source IO error.
        source: io::Error,
    },
    /// Interactive prompt requested without a terminal.
    #[error("password prompt requires an interactive terminal")]
    NotInteractive,
}

/// Convenience alias for credential results.
pub type CredentialResult<T> = Result<T, CredentialError>;
