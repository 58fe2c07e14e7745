//! Startup validation turning a raw `ServerConfig` into a `ValidatedConfig`.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    AccessPolicy, AuthSource, ListenerSettings, ListingMode, ServerConfig, TlsFiles, TlsVersion,
    ValidatedConfig,
};

impl ServerConfig {
    /// Validate the configuration and freeze it into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    pub fn validate(self) -> ConfigResult<ValidatedConfig> {
        let tls = validate_tls(&self.tls_cert, &self.tls_key)?;
        let tls_min_version = validate_tls_min(&self.tls_min_vers, tls.is_some())?;
        validate_url_prefix(&self.url_prefix)?;
        let folder = validate_folder(&self.folder)?;
        let auth = resolve_auth(&self.credentials, &self.fast_auth)?;

        let policy = AccessPolicy {
            referrers: self.referrers.clone(),
            access_key: self.access_key.clone(),
            cors: self.cors,
            listing: ListingMode::from_flags(self.show_listing, self.allow_index),
            url_prefix: self.url_prefix.clone(),
            tls_min_version,
        };
        let listener = ListenerSettings {
            host: self.host.clone(),
            port: self.port,
            tls,
        };

        Ok(ValidatedConfig {
            folder,
            policy,
            listener,
            auth,
            debug: self.debug,
            raw: self,
        })
    }
}

/// Split a `username:password` pair.
///
/// # Errors
///
/// Returns an error unless the value holds exactly one `:` with non-empty sides.
pub fn parse_fast_auth(value: &str) -> ConfigResult<(String, String)> {
    let invalid = || {
        ConfigError::invalid(
            "fast-auth",
            None,
            "must be 'username:password' with exactly one ':'",
        )
    };
    let (username, password) = value.split_once(':').ok_or_else(invalid)?;
    if username.is_empty() || password.is_empty() || password.contains(':') {
        return Err(invalid());
    }
    Ok((username.to_string(), password.to_string()))
}

fn validate_tls(cert: &str, key: &str) -> ConfigResult<Option<TlsFiles>> {
    match (cert.is_empty(), key.is_empty()) {
        (true, true) => Ok(None),
        (false, true) => Err(ConfigError::invalid(
            "tls-key",
            None,
            "tls-cert requires tls-key",
        )),
        (true, false) => Err(ConfigError::invalid(
            "tls-cert",
            None,
            "tls-key requires tls-cert",
        )),
        (false, false) => {
            require_file("tls-cert", cert)?;
            require_file("tls-key", key)?;
            Ok(Some(TlsFiles {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }))
        }
    }
}

fn validate_tls_min(value: &str, tls_enabled: bool) -> ConfigResult<TlsVersion> {
    if value.is_empty() {
        return Ok(TlsVersion::DEFAULT);
    }
    if !tls_enabled {
        return Err(ConfigError::invalid(
            "tls-min-vers",
            Some(value.to_string()),
            "requires tls-cert and tls-key",
        ));
    }
    value.parse()
}

fn validate_url_prefix(prefix: &str) -> ConfigResult<()> {
    if prefix.is_empty() {
        return Ok(());
    }
    if !prefix.starts_with('/') {
        return Err(ConfigError::invalid(
            "url-prefix",
            Some(prefix.to_string()),
            "must start with '/'",
        ));
    }
    if prefix.ends_with('/') {
        return Err(ConfigError::invalid(
            "url-prefix",
            Some(prefix.to_string()),
            "must not end with '/'",
        ));
    }
    Ok(())
}

fn validate_folder(folder: &str) -> ConfigResult<PathBuf> {
    let path = Path::new(folder);
    let metadata = path.metadata().map_err(|source| ConfigError::Io {
        operation: "config.folder",
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ConfigError::invalid(
            "folder",
            Some(folder.to_string()),
            "must be a directory",
        ));
    }
    Ok(path.to_path_buf())
}

fn require_file(field: &'static str, value: &str) -> ConfigResult<()> {
    if Path::new(value).is_file() {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            Some(value.to_string()),
            "file does not exist",
        ))
    }
}

fn resolve_auth(credentials: &str, fast_auth: &str) -> ConfigResult<AuthSource> {
    if !credentials.is_empty() {
        if !fast_auth.is_empty() {
            warn!("fast-auth ignored because a credential file is configured");
        }
        return Ok(AuthSource::CredentialFile(PathBuf::from(credentials)));
    }
    if fast_auth.is_empty() {
        return Ok(AuthSource::Disabled);
    }
    let (username, password) = parse_fast_auth(fast_auth)?;
    Ok(AuthSource::Shared { username, password })
}
