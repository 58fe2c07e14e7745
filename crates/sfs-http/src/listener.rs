//! Plain HTTP or TLS listener selection.
//!
//! # Design
//! - TLS is chosen exactly when a certificate/key pair is configured.
//! - The TLS stack offers 1.2 and 1.3; lower floors are raised to 1.2.
//! - Handshake failures close only the affected connection.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use rustls::SupportedProtocolVersion;
use rustls::crypto::ring;
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use sfs_config::{TlsFiles, TlsVersion};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};

const ALPN_H2: &[u8] = b"h2";
const ALPN_HTTP11: &[u8] = b"http/1.1";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// Transport chosen at startup.
#[derive(Debug, Clone)]
pub enum Listener {
    /// Unencrypted HTTP.
    Plain,
    /// HTTPS with a prepared server configuration.
    Tls(Arc<rustls::ServerConfig>),
}

impl Listener {
    /// Select plain HTTP or TLS and prepare the TLS configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the certificate or key cannot be loaded or rejected.
    pub fn select(tls: Option<&TlsFiles>, min_version: TlsVersion) -> ServerResult<Self> {
        match tls {
            None => Ok(Self::Plain),
            Some(files) => Ok(Self::Tls(Arc::new(tls_server_config(files, min_version)?))),
        }
    }

    /// Whether this listener encrypts traffic.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Bind `addr` and serve `router` until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error when binding fails or the server stops unexpectedly.
    pub async fn serve(self, addr: SocketAddr, router: Router) -> ServerResult<()> {
        let service = router.into_make_service_with_connect_info::<SocketAddr>();
        match self {
            Self::Plain => {
                let listener = TcpListener::bind(addr)
                    .await
                    .map_err(|source| ServerError::Bind { addr, source })?;
                info!(%addr, "listening for http");
                axum::serve(listener, service)
                    .with_graceful_shutdown(shutdown_signal())
                    .await
                    .map_err(|source| ServerError::Serve { source })
            }
            Self::Tls(config) => {
                let handle = Handle::new();
                tokio::spawn(graceful_on_signal(handle.clone()));
                info!(%addr, "listening for https");
                axum_server::bind_rustls(addr, RustlsConfig::from_config(config))
                    .handle(handle)
                    .serve(service)
                    .await
                    .map_err(|source| ServerError::Listen { addr, source })
            }
        }
    }
}

/// Raise a requested floor into the range the TLS stack supports.
#[must_use]
pub fn clamp_min_version(requested: TlsVersion) -> TlsVersion {
    if requested < TlsVersion::Tls12 {
        warn!(
            requested = %requested,
            effective = %TlsVersion::Tls12,
            "minimum tls version raised to supported floor"
        );
        TlsVersion::Tls12
    } else {
        requested
    }
}

/// Protocol versions enabled for a given floor.
#[must_use]
pub fn protocol_versions(min_version: TlsVersion) -> &'static [&'static SupportedProtocolVersion] {
    match clamp_min_version(min_version) {
        TlsVersion::Tls13 => TLS13_ONLY,
        _ => rustls::ALL_VERSIONS,
    }
}

fn tls_server_config(
    files: &TlsFiles,
    min_version: TlsVersion,
) -> ServerResult<rustls::ServerConfig> {
    let certs = load_certs(&files.cert)?;
    let key = PrivateKeyDer::from_pem_file(&files.key).map_err(|source| ServerError::TlsPem {
        path: files.key.clone(),
        source,
    })?;
    let mut config =
        rustls::ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
            .with_protocol_versions(protocol_versions(min_version))
            .map_err(|source| ServerError::TlsConfig { source })?
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|source| ServerError::TlsConfig { source })?;
    config.alpn_protocols = vec![ALPN_H2.to_vec(), ALPN_HTTP11.to_vec()];
    Ok(config)
}

fn load_certs(path: &Path) -> ServerResult<Vec<CertificateDer<'static>>> {
    let pem_error = |source| ServerError::TlsPem {
        path: path.to_path_buf(),
        source,
    };
    let certs = CertificateDer::pem_file_iter(path)
        .map_err(pem_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(pem_error)?;
    if certs.is_empty() {
        return Err(ServerError::TlsEmptyChain {
            path: path.to_path_buf(),
        });
    }
    Ok(certs)
}

/// Resolve when the process receives Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for sigterm");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

async fn graceful_on_signal(handle: Handle) {
    shutdown_signal().await;
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
