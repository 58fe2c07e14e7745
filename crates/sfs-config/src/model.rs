//! Typed configuration models.
//!
//! # Design
//! - `ServerConfig` mirrors the YAML document and environment surface one field per key.
//! - `ValidatedConfig` is the immutable snapshot handed to bootstrap; nothing mutates it later.
//! - `AccessPolicy` carries only the flags the request pipeline consumes.

use std::fmt::{self, Display, Formatter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_ALLOW_INDEX, DEFAULT_FOLDER, DEFAULT_PORT, DEFAULT_SHOW_LISTING};
use crate::error::{ConfigError, ConfigResult};

const REDACTED: &str = "<redacted>";

/// Raw configuration as read from YAML and environment overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    /// Emit wildcard CORS headers on every response.
    pub cors: bool,
    /// Log every request and the effective configuration.
    pub debug: bool,
    /// Folder whose contents are served.
    pub folder: String,
    /// Host name or address to bind; empty binds every interface.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Serve `index.html` for directory requests even when listings are hidden.
    pub allow_index: bool,
    /// Resolve directory requests to their index (or a listing).
    pub show_listing: bool,
    /// PEM certificate chain enabling TLS.
    pub tls_cert: String,
    /// PEM private key enabling TLS.
    pub tls_key: String,
    /// Minimum TLS protocol version identifier (`tls10` .. `tls13`).
    pub tls_min_vers: String,
    /// URL path prefix stripped before resolving files.
    pub url_prefix: String,
    /// Allowed `Referer` prefixes; an empty entry admits requests without one.
    pub referrers: Vec<String>,
    /// Shared secret for per-path access keys.
    pub access_key: String,
    /// Credential file enabling basic authentication.
    pub credentials: String,
    /// Inline `username:password` pair enabling basic authentication.
    pub fast_auth: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cors: false,
            debug: false,
            folder: DEFAULT_FOLDER.to_string(),
            host: String::new(),
            port: DEFAULT_PORT,
            allow_index: DEFAULT_ALLOW_INDEX,
            show_listing: DEFAULT_SHOW_LISTING,
            tls_cert: String::new(),
            tls_key: String::new(),
            tls_min_vers: String::new(),
            url_prefix: String::new(),
            referrers: Vec::new(),
            access_key: String::new(),
            credentials: String::new(),
            fast_auth: String::new(),
        }
    }
}

impl ServerConfig {
    /// Copy of the configuration with secret values masked, suitable for logging.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mask = |value: &str| {
            if value.is_empty() {
                String::new()
            } else {
                REDACTED.to_string()
            }
        };
        Self {
            access_key: mask(&self.access_key),
            fast_auth: mask(&self.fast_auth),
            ..self.clone()
        }
    }

    /// Render the redacted configuration as YAML for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        serde_yaml::to_string(&self.redacted()).unwrap_or_default()
    }
}

/// Directory listing behaviour for paths ending in `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingMode {
    /// Directory requests are always answered with 404.
    Hidden,
    /// Directory requests succeed only when an `index.html` exists.
    AllowIndexOnly,
    /// Directory requests resolve to the index or a generated listing.
    Shown,
}

impl ListingMode {
    /// Derive the mode from the `show-listing` and `allow-index` flags.
    #[must_use]
    pub const fn from_flags(show_listing: bool, allow_index: bool) -> Self {
        match (show_listing, allow_index) {
            (true, _) => Self::Shown,
            (false, true) => Self::AllowIndexOnly,
            (false, false) => Self::Hidden,
        }
    }

    /// Stable identifier used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::AllowIndexOnly => "allow-index-only",
            Self::Shown => "shown",
        }
    }
}

impl Display for ListingMode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// TLS protocol versions that may be requested as a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TlsVersion {
    /// TLS 1.0.
    Tls10,
    /// TLS 1.1.
    Tls11,
    /// TLS 1.2.
    Tls12,
    /// TLS 1.3.
    Tls13,
}

impl TlsVersion {
    /// Floor used when no minimum is configured.
    pub const DEFAULT: Self = Self::Tls10;

    /// Human-readable protocol label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tls10 => "TLS1.0",
            Self::Tls11 => "TLS1.1",
            Self::Tls12 => "TLS1.2",
            Self::Tls13 => "TLS1.3",
        }
    }
}

impl Default for TlsVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for TlsVersion {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for TlsVersion {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tls10" => Ok(Self::Tls10),
            "tls11" => Ok(Self::Tls11),
            "tls12" => Ok(Self::Tls12),
            "tls13" => Ok(Self::Tls13),
            _ => Err(ConfigError::invalid(
                "tls-min-vers",
                Some(value.to_string()),
                "must be one of tls10, tls11, tls12, tls13",
            )),
        }
    }
}

/// Immutable snapshot of the flags consumed by the request pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Allowed `Referer` prefixes; empty disables the check.
    pub referrers: Vec<String>,
    /// Access-key secret; empty disables the check.
    pub access_key: String,
    /// Inject wildcard CORS headers.
    pub cors: bool,
    /// Directory listing behaviour.
    pub listing: ListingMode,
    /// URL prefix stripped before resolution; empty serves paths verbatim.
    pub url_prefix: String,
    /// Requested TLS protocol floor.
    pub tls_min_version: TlsVersion,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            referrers: Vec::new(),
            access_key: String::new(),
            cors: false,
            listing: ListingMode::Shown,
            url_prefix: String::new(),
            tls_min_version: TlsVersion::DEFAULT,
        }
    }
}

/// Where basic-authentication credentials come from.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthSource {
    /// Basic authentication is not enforced.
    Disabled,
    /// Credentials are loaded from a JSON file.
    CredentialFile(PathBuf),
    /// A single in-memory credential from `username:password`.
    Shared {
        /// Username accepted by the guard.
        username: String,
        /// Plaintext password hashed at startup.
        password: String,
    },
}

impl fmt::Debug for AuthSource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => formatter.write_str("Disabled"),
            Self::CredentialFile(path) => formatter
                .debug_tuple("CredentialFile")
                .field(path)
                .finish(),
            Self::Shared { username, .. } => formatter
                .debug_struct("Shared")
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
        }
    }
}

/// Certificate and key pair enabling TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsFiles {
    /// PEM certificate chain.
    pub cert: PathBuf,
    /// PEM private key.
    pub key: PathBuf,
}

/// Socket settings for the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSettings {
    /// Host to bind; empty binds every interface.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// TLS material; `None` serves plain HTTP.
    pub tls: Option<TlsFiles>,
}

impl ListenerSettings {
    /// Resolve the configured host and port to a socket address.
    ///
    /// # Errors
    ///
    /// Returns an error when the host name cannot be resolved.
    pub fn bind_addr(&self) -> ConfigResult<SocketAddr> {
        if self.host.is_empty() {
            return Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port)));
        }
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }
        let mut addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| ConfigError::HostResolution {
                host: self.host.clone(),
                source,
            })?;
        addrs.next().ok_or_else(|| {
            ConfigError::invalid(
                "host",
                Some(self.host.clone()),
                "resolved to no addresses",
            )
        })
    }
}

/// Configuration after validation; the single snapshot driving bootstrap.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Existing directory whose contents are served.
    pub folder: PathBuf,
    /// Pipeline policy flags.
    pub policy: AccessPolicy,
    /// Listener settings.
    pub listener: ListenerSettings,
    /// Basic-authentication source.
    pub auth: AuthSource,
    /// Request logging toggle.
    pub debug: bool,
    /// Raw configuration the snapshot was derived from.
    pub raw: ServerConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_mode_follows_flag_precedence() {
        assert_eq!(ListingMode::from_flags(true, false), ListingMode::Shown);
        assert_eq!(ListingMode::from_flags(true, true), ListingMode::Shown);
        assert_eq!(
            ListingMode::from_flags(false, true),
            ListingMode::AllowIndexOnly
        );
        assert_eq!(ListingMode::from_flags(false, false), ListingMode::Hidden);
    }

    #[test]
    fn tls_version_parses_known_identifiers() -> anyhow::Result<()> {
        assert_eq!("tls10".parse::<TlsVersion>()?, TlsVersion::Tls10);
        assert_eq!("TLS12".parse::<TlsVersion>()?, TlsVersion::Tls12);
        assert_eq!("tls13".parse::<TlsVersion>()?, TlsVersion::Tls13);
        assert!("ssl3".parse::<TlsVersion>().is_err());
        assert!(TlsVersion::Tls11 < TlsVersion::Tls12);
        assert_eq!(TlsVersion::Tls13.to_string(), "TLS1.3");
        Ok(())
    }

    #[test]
    fn redacted_masks_secrets_only_when_set() {
        let config = ServerConfig {
            access_key: "secret".to_string(),
            ..ServerConfig::default()
        };
        let redacted = config.redacted();
        assert_eq!(redacted.access_key, REDACTED);
        assert!(redacted.fast_auth.is_empty());
        assert_eq!(redacted.folder, config.folder);
        assert!(!config.describe().contains("secret"));
    }

    #[test]
    fn auth_source_debug_hides_password() {
        let source = AuthSource::Shared {
            username: "user".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{source:?}");
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn bind_addr_defaults_to_unspecified() -> anyhow::Result<()> {
        let settings = ListenerSettings {
            host: String::new(),
            port: 8080,
            tls: None,
        };
        assert_eq!(settings.bind_addr()?, "0.0.0.0:8080".parse()?);

        let settings = ListenerSettings {
            host: "127.0.0.1".to_string(),
            port: 9000,
            tls: None,
        };
        assert_eq!(settings.bind_addr()?, "127.0.0.1:9000".parse()?);
        Ok(())
    }
}
