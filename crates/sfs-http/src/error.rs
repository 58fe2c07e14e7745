//! # Design
//!
//! - One error type for listener setup and serve failures.
//! - Messages stay constant; context lives in structured fields.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Result alias for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors raised while configuring or running the listener.
#[derive(Debug)]
pub enum ServerError {
    /// Binding the plain listener failed.
    Bind {
        /// Address attempted.
        addr: SocketAddr,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Serving plain HTTP failed.
    Serve {
        /// Underlying IO error.
        source: io::Error,
    },
    /// Binding or serving the TLS listener failed.
    Listen {
        /// Address attempted.
        addr: SocketAddr,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A PEM file could not be read or decoded.
    TlsPem {
        /// File that failed.
        path: PathBuf,
        /// Underlying PEM error.
        source: rustls_pki_types::pem::Error,
    },
    /// The certificate chain file held no certificates.
    TlsEmptyChain {
        /// File that was read.
        path: PathBuf,
    },
    /// Building the TLS server configuration failed.
    TlsConfig {
        /// Underlying rustls error.
        source: rustls::Error,
    },
}

impl Display for ServerError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { .. } => formatter.write_str("failed to bind listener"),
            Self::Serve { .. } => formatter.write_str("server terminated unexpectedly"),
            Self::Listen { .. } => formatter.write_str("tls server terminated unexpectedly"),
            Self::TlsPem { .. } => formatter.write_str("failed to read tls pem file"),
            Self::TlsEmptyChain { .. } => {
                formatter.write_str("tls certificate file contains no certificates")
            }
            Self::TlsConfig { .. } => formatter.write_str("invalid tls configuration"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Bind { source, .. } | Self::Serve { source } | Self::Listen { source, .. } => {
                Some(source)
            }
            Self::TlsPem { source, .. } => Some(source),
            Self::TlsConfig { source } => Some(source),
            Self::TlsEmptyChain { .. } => None,
        }
    }
}
